use subtle::ConstantTimeEq;

use super::CryptoProvider;

/// Entropy of the one-time recovery code: 16 bytes, 32 hex chars.
pub const BACKUP_CODE_BYTES: usize = 16;
/// Entropy of the lookup key: 8 bytes, 16 hex chars. 64 bits is the designed
/// collision margin between two generated credentials.
pub const BACKUP_KEY_ID_BYTES: usize = 8;

/// One-time recovery credential for a newly provisioned super-admin.
///
/// `code` is returned to the caller exactly once; only `hashed_code` is ever
/// persisted. `hashed_code == hex(SHA256(code))` holds by construction and
/// can be re-verified at redemption time with [`BackupCredential::verify`].
#[derive(Clone)]
pub struct BackupCredential {
    pub code: String,
    pub key_id: String,
    pub hashed_code: String,
}

impl BackupCredential {
    pub fn generate(crypto: &dyn CryptoProvider) -> Self {
        let mut code_bytes = [0u8; BACKUP_CODE_BYTES];
        crypto.random_bytes(&mut code_bytes);
        let code = hex::encode(code_bytes);

        let mut key_bytes = [0u8; BACKUP_KEY_ID_BYTES];
        crypto.random_bytes(&mut key_bytes);
        let key_id = hex::encode(key_bytes);

        let hashed_code = hex::encode(crypto.sha256(code.as_bytes()));

        let credential = Self {
            code,
            key_id,
            hashed_code,
        };
        debug_assert!(credential.verify(&credential.code, crypto));
        credential
    }

    /// Recompute the hash of `candidate` and compare it to the stored hash
    /// in constant time.
    pub fn verify(&self, candidate: &str, crypto: &dyn CryptoProvider) -> bool {
        let recomputed = hex::encode(crypto.sha256(candidate.as_bytes()));
        recomputed
            .as_bytes()
            .ct_eq(self.hashed_code.as_bytes())
            .into()
    }
}

// The plaintext code must never end up in logs.
impl std::fmt::Debug for BackupCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupCredential")
            .field("code", &"<redacted>")
            .field("key_id", &self.key_id)
            .field("hashed_code", &self.hashed_code)
            .finish()
    }
}
