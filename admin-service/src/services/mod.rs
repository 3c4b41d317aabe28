//! Services layer for admin-service.
//!
//! Business logic for super-admin provisioning plus the external
//! collaborators it depends on (identity directory, document store,
//! audit trail).

mod audit;
mod database;
mod error;
mod identity;
mod jwt;
mod provisioning;

pub use audit::AuditService;
pub use database::{AdminStore, MemoryStore, MongoDb};
pub use error::ProvisionError;
pub use identity::{
    HttpIdentityDirectory, Identity, IdentityDirectory, MockDirectory, SuperAdminClaims,
};
pub use jwt::{CallerVerifier, TokenClaims};
pub use provisioning::{ProvisioningService, BACKUP_CODE_WARNING};
