//! Configuration Error Types
//!
//! Returned synchronously by every registry and credentials operation.

use thiserror::Error;

use crate::store::StoreError;

/// Errors from administrative configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Caller is not an owner.
    #[error("Forbidden: only bot owners can change EventSub configuration")]
    Forbidden,

    /// Input rejected before any write.
    #[error("Validation: {0}")]
    Validation(String),

    /// No subscription for the given event type.
    #[error("No subscription found for `{0}`")]
    NotFound(String),

    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
