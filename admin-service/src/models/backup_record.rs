use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PURPOSE_INITIAL_CREATION: &str = "initial_creation";

/// Persisted hash of a one-time recovery code. The plaintext code is never
/// stored; `used` flips to true exactly once, when the code is redeemed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRecord {
    pub uid: String,
    /// Assigned by the store at commit time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub hashed_code: String,
    pub used: bool,
    pub purpose: String,
}

impl BackupRecord {
    pub fn for_initial_creation(uid: &str, hashed_code: &str) -> Self {
        Self {
            uid: uid.to_string(),
            created_at: None,
            hashed_code: hashed_code.to_string(),
            used: false,
            purpose: PURPOSE_INITIAL_CREATION.to_string(),
        }
    }
}
