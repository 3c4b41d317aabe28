//! Super-administrator provisioning workflow.
//!
//! Strictly sequential: authorization gate, input validation, identity
//! creation, backup credential generation, privilege assignment, atomic
//! record persistence, audit logging. Each step's failure aborts the
//! remainder except audit logging, which runs on both paths. A claims or
//! persistence failure leaves an orphaned account behind; there is no
//! compensating transaction, the audit trail flags it for manual
//! remediation.

use std::sync::Arc;

use subtle::ConstantTimeEq;

use crate::dtos::{CreateSuperAdminRequest, CreateSuperAdminResponse};
use crate::middleware::CallerContext;
use crate::models::{AdminRecord, BackupRecord};
use crate::services::{
    AdminStore, AuditService, IdentityDirectory, ProvisionError, SuperAdminClaims,
};
use crate::utils::{validate_email, validate_password, BackupCredential, CryptoProvider};

/// Returned alongside the one-time backup code in the success payload.
pub const BACKUP_CODE_WARNING: &str =
    "Store the backup code securely. It will never be shown again.";

pub struct ProvisioningService {
    directory: Arc<dyn IdentityDirectory>,
    store: Arc<dyn AdminStore>,
    audit: AuditService,
    crypto: Arc<dyn CryptoProvider>,
    provisioning_secret: String,
    min_password_length: usize,
}

impl ProvisioningService {
    pub fn new(
        directory: Arc<dyn IdentityDirectory>,
        store: Arc<dyn AdminStore>,
        audit: AuditService,
        crypto: Arc<dyn CryptoProvider>,
        provisioning_secret: String,
        min_password_length: usize,
    ) -> Self {
        Self {
            directory,
            store,
            audit,
            crypto,
            provisioning_secret,
            min_password_length,
        }
    }

    pub async fn create_super_admin(
        &self,
        request: CreateSuperAdminRequest,
        context: &CallerContext,
    ) -> Result<CreateSuperAdminResponse, ProvisionError> {
        self.authorize(context, &request.secret)?;
        self.validate(&request)?;

        let identity = match self
            .directory
            .create_user(&request.email, &request.password)
            .await
        {
            Ok(identity) => identity,
            Err(err) => {
                let err = ProvisionError::Provisioning(err);
                // No uid: the account was never created.
                self.audit.log_failure(None, &err).await;
                return Err(err);
            }
        };

        let backup = BackupCredential::generate(self.crypto.as_ref());

        let claims = SuperAdminClaims::granted_now();
        if let Err(err) = self
            .directory
            .set_custom_claims(&identity.uid, &claims)
            .await
        {
            let err = ProvisionError::Claims(err);
            self.audit.log_failure(Some(&identity.uid), &err).await;
            return Err(err);
        }

        let admin = AdminRecord::new(&identity, &backup, context);
        let record = BackupRecord::for_initial_creation(&identity.uid, &backup.hashed_code);
        if let Err(err) = self.store.persist_admin(&admin, &record).await {
            let err = ProvisionError::Persistence(err);
            self.audit.log_failure(Some(&identity.uid), &err).await;
            return Err(err);
        }

        self.audit.log_success(&identity.uid, context).await;

        Ok(CreateSuperAdminResponse {
            success: true,
            uid: identity.uid,
            backup_code: backup.code.clone(),
            backup_key: backup.key_id.clone(),
            warning: BACKUP_CODE_WARNING.to_string(),
        })
    }

    /// All four conditions must hold. The denial is deliberately uniform:
    /// neither the caller nor the audit trail learns which one failed.
    fn authorize(&self, context: &CallerContext, secret: &str) -> Result<(), ProvisionError> {
        let secret_ok: bool = secret
            .as_bytes()
            .ct_eq(self.provisioning_secret.as_bytes())
            .into();

        let authorized = context.authenticated
            & context.claims.super_admin
            & secret_ok
            & context.claims.ip_whitelisted;

        if authorized {
            Ok(())
        } else {
            tracing::warn!(
                ip = %context.caller_ip,
                "Rejected super-admin provisioning attempt"
            );
            Err(ProvisionError::PermissionDenied)
        }
    }

    fn validate(&self, request: &CreateSuperAdminRequest) -> Result<(), ProvisionError> {
        validate_email(&request.email)
            .map_err(|e| ProvisionError::Validation(e.to_string()))?;
        validate_password(&request.password, self.min_password_length)
            .map_err(|e| ProvisionError::Validation(e.to_string()))?;
        Ok(())
    }
}
