use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

use crate::utils::DEFAULT_MIN_PASSWORD_LENGTH;

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub mongodb: MongoConfig,
    pub identity: IdentityProviderConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityProviderConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Shared secret every provisioning request must present.
    pub provisioning_secret: String,
    /// Source IPs allowed to provision super-admins.
    pub admin_ip_whitelist: Vec<String>,
    pub min_password_length: usize,
    pub jwt_public_key_path: String,
    pub allowed_origins: Vec<String>,
}

impl AdminConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = AdminConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("admin-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", None, is_prod)?,
            },
            identity: IdentityProviderConfig {
                base_url: get_env(
                    "IDENTITY_PROVIDER_URL",
                    Some("http://localhost:9099"),
                    is_prod,
                )?,
                api_key: get_env("IDENTITY_PROVIDER_API_KEY", None, true)?,
            },
            security: SecurityConfig {
                provisioning_secret: get_env("SUPERADMIN_PROVISIONING_SECRET", None, true)?,
                admin_ip_whitelist: get_env("ADMIN_IP_WHITELIST", Some("127.0.0.1"), is_prod)?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                min_password_length: get_env(
                    "MIN_PASSWORD_LENGTH",
                    Some("12"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(DEFAULT_MIN_PASSWORD_LENGTH),
                jwt_public_key_path: get_env(
                    "JWT_PUBLIC_KEY_PATH",
                    Some("keys/jwt_public.pem"),
                    is_prod,
                )?,
                allowed_origins: get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:3000"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.security.min_password_length < DEFAULT_MIN_PASSWORD_LENGTH {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "MIN_PASSWORD_LENGTH must be at least {}",
                DEFAULT_MIN_PASSWORD_LENGTH
            )));
        }

        if self.security.provisioning_secret.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "SUPERADMIN_PROVISIONING_SECRET must not be empty"
            )));
        }

        // In production, ensure stricter validation
        if self.environment == Environment::Prod
            && self.security.allowed_origins.iter().any(|o| o == "*")
        {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Wildcard CORS origin not allowed in production"
            )));
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
