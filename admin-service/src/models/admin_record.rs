use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::CallerContext;
use crate::services::Identity;
use crate::utils::BackupCredential;

pub const ADMIN_STATUS_ACTIVE: &str = "active";

/// Persisted record of a provisioned super-admin account.
///
/// Created exactly once per provisioning call; later lifecycle mutations
/// (deactivation, etc.) belong to unrelated account-management flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRecord {
    pub uid: String,
    pub email: String,
    /// Assigned by the store at commit time, not by this process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub backup_code_hash: String,
    pub backup_key_id: String,
    pub is_active: bool,
    pub created_by: String,
    pub ip_address: String,
    pub status: String,
}

impl AdminRecord {
    pub fn new(identity: &Identity, backup: &BackupCredential, context: &CallerContext) -> Self {
        Self {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            created_at: None,
            backup_code_hash: backup.hashed_code.clone(),
            backup_key_id: backup.key_id.clone(),
            is_active: true,
            created_by: context.caller_uid.clone(),
            ip_address: context.caller_ip.clone(),
            status: ADMIN_STATUS_ACTIVE.to_string(),
        }
    }
}
