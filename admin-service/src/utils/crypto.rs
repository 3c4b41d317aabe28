use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Capability interface for the primitives the backup credential generator
/// depends on. Injected so the generator never reaches for a platform API
/// directly; the production implementation is [`OsCrypto`].
pub trait CryptoProvider: Send + Sync {
    /// Fill `buf` with cryptographically secure random bytes.
    fn random_bytes(&self, buf: &mut [u8]);

    /// SHA-256 digest of `data`.
    fn sha256(&self, data: &[u8]) -> [u8; 32];
}

/// OS-backed implementation: CSPRNG from the operating system, SHA-256 from
/// the `sha2` crate.
#[derive(Debug, Clone, Default)]
pub struct OsCrypto;

impl CryptoProvider for OsCrypto {
    fn random_bytes(&self, buf: &mut [u8]) {
        OsRng.fill_bytes(buf);
    }

    fn sha256(&self, data: &[u8]) -> [u8; 32] {
        Sha256::digest(data).into()
    }
}
