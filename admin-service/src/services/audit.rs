//! Audit trail for super-admin provisioning.
//!
//! Writes are fire-and-forget relative to the main result: a failed audit
//! append is reported through `tracing::error!` and never changes the
//! outcome of the operation being audited.

use std::sync::Arc;

use crate::middleware::CallerContext;
use crate::models::AuditEvent;
use crate::services::{AdminStore, ProvisionError};

#[derive(Clone)]
pub struct AuditService {
    store: Arc<dyn AdminStore>,
}

impl AuditService {
    pub fn new(store: Arc<dyn AdminStore>) -> Self {
        Self { store }
    }

    pub async fn log_success(&self, uid: &str, context: &CallerContext) {
        let event = AuditEvent::superadmin_created(uid, context);
        if let Err(err) = self.store.append_audit(&event).await {
            tracing::error!(
                error = %format!("{err:#}"),
                uid = %uid,
                "Failed to write success audit event"
            );
        } else {
            tracing::info!(
                uid = %uid,
                performer = %context.caller_uid,
                "Super-admin provisioned"
            );
        }
    }

    /// `uid` is included only when account creation itself completed.
    pub async fn log_failure(&self, uid: Option<&str>, error: &ProvisionError) {
        // Message plus the debug rendering of the cause chain, the closest
        // thing to a stack trace the error carries.
        let detail = format!("{error} | {error:?}");
        let event = AuditEvent::superadmin_creation_failed(uid, detail);
        if let Err(err) = self.store.append_audit(&event).await {
            tracing::error!(
                error = %format!("{err:#}"),
                "Failed to write failure audit event"
            );
        } else {
            tracing::warn!(
                uid = ?uid,
                error = %error,
                "Super-admin provisioning failed"
            );
        }
    }
}
