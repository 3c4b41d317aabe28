use serde::{Deserialize, Serialize};

/// Body of `POST /admin/superadmins`. Transient: the password is forwarded
/// only to the identity provider, the secret only compared against
/// configuration; neither is persisted or logged.
#[derive(Clone, Deserialize)]
pub struct CreateSuperAdminRequest {
    pub email: String,
    pub password: String,
    pub secret: String,
}

impl std::fmt::Debug for CreateSuperAdminRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateSuperAdminRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Success payload. `backup_code` is shown exactly once; only its hash
/// survives in the store.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSuperAdminResponse {
    pub success: bool,
    pub uid: String,
    pub backup_code: String,
    pub backup_key: String,
    pub warning: String,
}
