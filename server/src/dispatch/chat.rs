//! Outbound chat capability.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::subscriptions::ChannelId;

/// Errors from a single send attempt.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    /// The attempt did not finish within the per-attempt timeout.
    #[error("send timed out after {0:?}")]
    Timeout(Duration),

    /// Network failure, rate limit or server error. Worth retrying.
    #[error("transient send failure: {0}")]
    Transient(String),

    /// The chat service refused the message (unknown channel, missing
    /// permission, bad request). Retrying will not help.
    #[error("message rejected: {0}")]
    Rejected(String),
}

impl ChatError {
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// "Send message to channel" capability of the chat client.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_message(&self, channel: &ChannelId, content: &str) -> Result<(), ChatError>;
}
