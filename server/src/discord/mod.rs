//! Discord Chat Client
//!
//! Posts rendered event messages through the Discord REST API
//! (`POST /channels/{id}/messages`).

use std::fmt;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::dispatch::{ChatClient, ChatError};
use crate::subscriptions::ChannelId;

/// Discord's message length limit in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Bot-token authenticated Discord REST client.
#[derive(Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl fmt::Debug for DiscordClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl DiscordClient {
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                "DiscordBot (https://github.com/yourorg/eventsub-relay, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn messages_url(&self, channel: &ChannelId) -> String {
        format!("{}/channels/{}/messages", self.api_base, channel)
    }
}

/// Cut a message down to Discord's limit.
fn truncate(content: &str) -> &str {
    match content.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// Channel ids are numeric snowflakes.
fn is_snowflake(channel: &ChannelId) -> bool {
    let id = channel.as_str();
    !id.is_empty() && id.len() <= 20 && id.bytes().all(|b| b.is_ascii_digit())
}

/// Map a response status to a send result.
fn classify_status(status: StatusCode) -> Result<(), ChatError> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        Err(ChatError::Transient(format!("HTTP {status}")))
    } else {
        Err(ChatError::Rejected(format!("HTTP {status}")))
    }
}

#[async_trait]
impl ChatClient for DiscordClient {
    async fn send_message(&self, channel: &ChannelId, content: &str) -> Result<(), ChatError> {
        if !is_snowflake(channel) {
            return Err(ChatError::Rejected(format!(
                "`{channel}` is not a Discord channel id"
            )));
        }

        let body = serde_json::json!({
            "content": truncate(content),
            "allowed_mentions": { "parse": [] },
        });

        let response = self
            .http
            .post(self.messages_url(channel))
            .header("Authorization", format!("Bot {}", self.token))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Transient(e.to_string()))?;

        let status = response.status();
        debug!(channel = %channel, status = status.as_u16(), "Discord responded");
        classify_status(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_discord_limit() {
        let long = "é".repeat(MAX_MESSAGE_CHARS + 10);
        assert_eq!(truncate(&long).chars().count(), MAX_MESSAGE_CHARS);
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn snowflake_validation() {
        assert!(is_snowflake(&ChannelId::from(1_234_567_890_123_456_789)));
        assert!(!is_snowflake(&ChannelId::new("general")));
        assert!(!is_snowflake(&ChannelId::new("")));
    }

    #[test]
    fn status_classification() {
        assert!(classify_status(StatusCode::OK).is_ok());
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            Err(ChatError::Transient(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY),
            Err(ChatError::Transient(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN),
            Err(ChatError::Rejected(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND),
            Err(ChatError::Rejected(_))
        ));
    }

    #[test]
    fn builds_message_url_without_double_slash() {
        let client = DiscordClient::new("token", "https://discord.test/api/v10/").unwrap();
        assert_eq!(
            client.messages_url(&ChannelId::from(42)),
            "https://discord.test/api/v10/channels/42/messages"
        );
        assert!(!format!("{client:?}").contains("token"));
    }

    #[tokio::test]
    async fn non_numeric_channel_is_rejected_without_request() {
        let client = DiscordClient::new("token", "http://127.0.0.1:1").unwrap();
        let err = client
            .send_message(&ChannelId::new("general"), "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Rejected(_)));
    }
}
