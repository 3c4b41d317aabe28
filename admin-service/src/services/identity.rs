use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::IdentityProviderConfig;

/// Identity created in the external directory.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

/// Elevated-privilege claims bundle attached to a provisioned super-admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperAdminClaims {
    pub super_admin: bool,
    pub role: String,
    pub security_level: String,
    /// Epoch milliseconds at assignment time.
    pub creation_time: i64,
    pub can_elevate: bool,
}

impl SuperAdminClaims {
    pub fn granted_now() -> Self {
        Self {
            super_admin: true,
            role: "super-admin".to_string(),
            security_level: "maximum".to_string(),
            creation_time: Utc::now().timestamp_millis(),
            can_elevate: true,
        }
    }
}

/// External authentication directory. Owns the credential lifecycle of the
/// accounts it creates; this service only consumes its API.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Create a verified, enabled account. Fails if the email is already
    /// registered or the provider rejects the password.
    async fn create_user(&self, email: &str, password: &str) -> Result<Identity, anyhow::Error>;

    /// Attach the claims bundle to an identity. Replaces any existing
    /// bundle, so re-applying the same claims is a no-op in effect.
    async fn set_custom_claims(
        &self,
        uid: &str,
        claims: &SuperAdminClaims,
    ) -> Result<(), anyhow::Error>;
}

/// REST client for the identity provider.
#[derive(Clone)]
pub struct HttpIdentityDirectory {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountBody<'a> {
    email: &'a str,
    password: &'a str,
    email_verified: bool,
    disabled: bool,
}

impl HttpIdentityDirectory {
    pub fn new(config: &IdentityProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl IdentityDirectory for HttpIdentityDirectory {
    async fn create_user(&self, email: &str, password: &str) -> Result<Identity, anyhow::Error> {
        let url = format!("{}/v1/accounts", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&CreateAccountBody {
                email,
                password,
                email_verified: true,
                disabled: false,
            })
            .send()
            .await
            .context("identity provider unreachable")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("identity provider rejected account creation ({status}): {body}");
        }

        let identity: Identity = response
            .json()
            .await
            .context("malformed account creation response")?;

        tracing::info!(uid = %identity.uid, "Identity created in directory");

        Ok(identity)
    }

    async fn set_custom_claims(
        &self,
        uid: &str,
        claims: &SuperAdminClaims,
    ) -> Result<(), anyhow::Error> {
        // PUT keeps the call idempotent under retry.
        let url = format!("{}/v1/accounts/{}/claims", self.base_url, uid);
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_key)
            .json(claims)
            .send()
            .await
            .context("identity provider unreachable")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("identity provider rejected claims assignment ({status}): {body}");
        }

        tracing::info!(uid = %uid, "Super-admin claims attached");

        Ok(())
    }
}

/// In-memory directory double with call counters, for tests and local runs.
#[derive(Default)]
pub struct MockDirectory {
    pub create_calls: std::sync::atomic::AtomicUsize,
    pub claims_calls: std::sync::atomic::AtomicUsize,
    pub fail_create_with: std::sync::Mutex<Option<String>>,
    pub fail_claims_with: std::sync::Mutex<Option<String>>,
    pub last_claims: std::sync::Mutex<Option<SuperAdminClaims>>,
}

#[async_trait]
impl IdentityDirectory for MockDirectory {
    async fn create_user(&self, email: &str, _password: &str) -> Result<Identity, anyhow::Error> {
        let n = self
            .create_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(message) = self.fail_create_with.lock().unwrap().clone() {
            anyhow::bail!(message);
        }
        Ok(Identity {
            uid: format!("uid-{}", n + 1),
            email: email.to_string(),
        })
    }

    async fn set_custom_claims(
        &self,
        _uid: &str,
        claims: &SuperAdminClaims,
    ) -> Result<(), anyhow::Error> {
        self.claims_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(message) = self.fail_claims_with.lock().unwrap().clone() {
            anyhow::bail!(message);
        }
        *self.last_claims.lock().unwrap() = Some(claims.clone());
        Ok(())
    }
}
