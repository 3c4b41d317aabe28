use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(anyhow::Error),

    #[error("Forbidden: {0}")]
    Forbidden(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            message: String,
        }

        // Internal detail stays in the server log; the caller only ever sees
        // a coarse error kind and a generic message.
        let (status, kind, message) = match self {
            AppError::BadRequest(err) => {
                (StatusCode::BAD_REQUEST, "bad-request", err.to_string())
            }
            AppError::NotFound(err) => (StatusCode::NOT_FOUND, "not-found", err.to_string()),
            AppError::Unauthorized(err) => {
                (StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string())
            }
            AppError::Forbidden(_) => (
                StatusCode::FORBIDDEN,
                "permission-denied",
                "Permission denied".to_string(),
            ),
            AppError::InternalError(err) => {
                tracing::error!(error = %format!("{err:#}"), "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::DatabaseError(err) => {
                tracing::error!(error = %format!("{err:#}"), "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = %format!("{err:#}"), "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: kind.to_string(),
                message,
            }),
        )
            .into_response()
    }
}
