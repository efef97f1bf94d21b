//! Webhook Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use super::signing::VerifyError;
use crate::error::ConfigError;

/// Inbound webhook errors.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Malformed body or headers. Rejected, not retried.
    #[error("Validation: {0}")]
    Validation(String),

    /// Signature check failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] VerifyError),

    /// Message timestamp is outside the accepted window.
    #[error("Unauthorized: message timestamp outside the accepted window")]
    Stale,

    /// Configuration could not be read.
    #[error("Configuration unavailable")]
    Config(#[from] ConfigError),
}

/// Error response body for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            // Do not tell the sender which check failed.
            Self::Unauthorized(_) | Self::Stale => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Signature verification failed".to_string(),
            ),
            Self::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
