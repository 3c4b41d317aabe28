use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use service_core::error::AppError;

/// Claims carried by the caller's bearer token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    #[serde(default)]
    pub super_admin: bool,
    pub exp: usize,
}

/// Verifies RS256 bearer tokens issued by the platform's auth service.
#[derive(Clone)]
pub struct CallerVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl CallerVerifier {
    pub fn from_pem_file(path: &str) -> Result<Self, AppError> {
        let pem = std::fs::read(path)?;
        let key = DecodingKey::from_rsa_pem(&pem)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("invalid JWT public key: {e}")))?;
        Ok(Self {
            key,
            validation: Validation::new(Algorithm::RS256),
        })
    }

    pub fn decode(&self, token: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
        Ok(decode::<TokenClaims>(token, &self.key, &self.validation)?.claims)
    }
}
