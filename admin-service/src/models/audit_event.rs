use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::CallerContext;

pub const ACTION_SUPERADMIN_CREATION: &str = "superadmin_creation";
pub const ACTION_SUPERADMIN_CREATION_FAILED: &str = "superadmin_creation_failed";

/// Append-only audit trail entry. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    #[serde(rename = "_id")]
    pub id: String,
    pub action: String,
    /// Present only when the identity was actually created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Error message and cause chain on the failure path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn superadmin_created(uid: &str, context: &CallerContext) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action: ACTION_SUPERADMIN_CREATION.to_string(),
            uid: Some(uid.to_string()),
            performer: Some(context.caller_uid.clone()),
            ip_address: Some(context.caller_ip.clone()),
            user_agent: context.user_agent.clone(),
            detail: None,
            timestamp: Utc::now(),
        }
    }

    pub fn superadmin_creation_failed(uid: Option<&str>, detail: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action: ACTION_SUPERADMIN_CREATION_FAILED.to_string(),
            uid: uid.map(|s| s.to_string()),
            performer: None,
            ip_address: None,
            user_agent: None,
            detail: Some(detail),
            timestamp: Utc::now(),
        }
    }
}
