mod backup_code;
mod crypto;
mod validation;

pub use backup_code::{BackupCredential, BACKUP_CODE_BYTES, BACKUP_KEY_ID_BYTES};
pub use crypto::{CryptoProvider, OsCrypto};
pub use validation::{validate_email, validate_password, DEFAULT_MIN_PASSWORD_LENGTH};
