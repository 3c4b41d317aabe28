mod admin_record;
mod audit_event;
mod backup_record;

pub use admin_record::{AdminRecord, ADMIN_STATUS_ACTIVE};
pub use audit_event::{
    AuditEvent, ACTION_SUPERADMIN_CREATION, ACTION_SUPERADMIN_CREATION_FAILED,
};
pub use backup_record::{BackupRecord, PURPOSE_INITIAL_CREATION};
