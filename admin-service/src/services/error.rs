use service_core::error::AppError;
use thiserror::Error;

/// Failure taxonomy of the provisioning workflow.
///
/// Everything except `PermissionDenied` reaches the caller as a generic
/// `internal` error; the original message stays in the audit/error log.
/// Audit write failures are not represented here because they never
/// propagate out of the workflow.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("identity creation failed: {0}")]
    Provisioning(anyhow::Error),

    #[error("claims assignment failed: {0}")]
    Claims(anyhow::Error),

    #[error("record persistence failed: {0}")]
    Persistence(anyhow::Error),
}

impl From<ProvisionError> for AppError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::PermissionDenied => {
                AppError::Forbidden(anyhow::anyhow!("permission denied"))
            }
            other => AppError::InternalError(anyhow::Error::new(other)),
        }
    }
}
