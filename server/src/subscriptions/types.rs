//! Subscription Types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum length of an EventSub type name.
const MAX_EVENT_TYPE_LEN: usize = 128;

/// Maximum template length (Discord message limit).
pub const MAX_TEMPLATE_LEN: usize = 2000;

/// Opaque chat channel identifier (a Discord channel snowflake).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for ChannelId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Delivery rule for one event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRule {
    pub enabled: bool,
    #[serde(rename = "post_channel")]
    pub target_channel: ChannelId,
    pub message_template: String,
}

impl SubscriptionRule {
    /// An enabled rule.
    pub fn new(target_channel: ChannelId, message_template: impl Into<String>) -> Self {
        Self {
            enabled: true,
            target_channel,
            message_template: message_template.into(),
        }
    }

    /// Reject rules that must never reach the store.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_channel.as_str().trim().is_empty() {
            return Err(ConfigError::Validation(
                "Target channel must not be empty".to_string(),
            ));
        }
        if self.message_template.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Message template must not be empty".to_string(),
            ));
        }
        if self.message_template.chars().count() > MAX_TEMPLATE_LEN {
            return Err(ConfigError::Validation(format!(
                "Message template must be max {MAX_TEMPLATE_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Validate an EventSub type name such as `stream.online` or
/// `channel.channel_points_custom_reward_redemption.add`.
pub fn validate_event_type(event_type: &str) -> Result<(), ConfigError> {
    if event_type.is_empty() || event_type.len() > MAX_EVENT_TYPE_LEN {
        return Err(ConfigError::Validation(format!(
            "Event type must be between 1 and {MAX_EVENT_TYPE_LEN} characters"
        )));
    }
    let valid = event_type
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'));
    if !valid {
        return Err(ConfigError::Validation(
            "Event type may only contain lowercase letters, digits, '.', '_' and '-'".to_string(),
        ));
    }
    Ok(())
}
