//! Chat Delivery
//!
//! Sends one rendered message with bounded exponential backoff. Every attempt
//! runs under the policy's timeout. Delivery is at-most-once: after the last
//! attempt the message is dropped.

use thiserror::Error;
use tracing::{debug, warn};

use super::chat::{ChatClient, ChatError};
use super::config::RetryPolicy;
use crate::subscriptions::ChannelId;

/// Terminal delivery failures.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Every attempt failed with a retryable error.
    #[error("delivery failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: ChatError },

    /// The chat service refused the message; not retried.
    #[error("delivery rejected on attempt {attempts}: {source}")]
    Rejected {
        attempts: u32,
        #[source]
        source: ChatError,
    },
}

/// Deliver a message, retrying transient failures.
///
/// Returns the number of attempts used.
pub async fn deliver(
    client: &dyn ChatClient,
    channel: &ChannelId,
    content: &str,
    policy: &RetryPolicy,
) -> Result<u32, DeliveryError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let send = client.send_message(channel, content);
        let result = match tokio::time::timeout(policy.attempt_timeout, send).await {
            Ok(result) => result,
            Err(_) => Err(ChatError::Timeout(policy.attempt_timeout)),
        };

        let error = match result {
            Ok(()) => {
                debug!(channel = %channel, attempt, "Message delivered");
                return Ok(attempt);
            }
            Err(e) => e,
        };

        if !error.is_retryable() {
            return Err(DeliveryError::Rejected {
                attempts: attempt,
                source: error,
            });
        }
        if attempt >= max_attempts {
            return Err(DeliveryError::Exhausted {
                attempts: attempt,
                last: error,
            });
        }

        let delay = policy.backoff_for(attempt);
        warn!(
            channel = %channel,
            attempt,
            retry_in_ms = delay.as_millis() as u64,
            error = %error,
            "Message delivery failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
