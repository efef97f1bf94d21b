//! Server Configuration
//!
//! Loads configuration from environment variables.

use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::credentials::CredentialSeed;
use crate::discord::DEFAULT_API_BASE;
use crate::dispatch::DispatchConfig;

/// Server configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080")
    pub bind_address: String,

    /// Redis connection URL (in-memory store when unset)
    pub redis_url: Option<String>,

    /// Prefix for configuration store keys (default: "eventsub")
    pub store_prefix: String,

    /// Discord bot token
    pub discord_bot_token: String,

    /// Discord REST API base URL
    pub discord_api_base: String,

    /// Platform user ids allowed to change configuration
    pub owner_ids: Vec<String>,

    /// Maximum webhook body size in bytes (default: 1MB)
    pub max_body_bytes: usize,

    /// Maximum age of a webhook message (default: 600s)
    pub max_message_age: Duration,

    /// Credential values written at startup when unset
    pub credential_seed: CredentialSeed,

    /// Template and retry policy
    pub dispatch: DispatchConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("redis_url", &self.redis_url.is_some())
            .field("store_prefix", &self.store_prefix)
            .field("discord_api_base", &self.discord_api_base)
            .field("owner_ids", &self.owner_ids)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("max_message_age", &self.max_message_age)
            .field("credential_seed", &self.credential_seed)
            .field("dispatch", &self.dispatch)
            .finish_non_exhaustive()
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            redis_url: non_empty("REDIS_URL"),
            store_prefix: env::var("STORE_PREFIX").unwrap_or_else(|_| "eventsub".into()),
            discord_bot_token: env::var("DISCORD_BOT_TOKEN")
                .context("DISCORD_BOT_TOKEN must be set")?,
            discord_api_base: env::var("DISCORD_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.into()),
            owner_ids: env::var("OWNER_IDS")
                .map(|s| comma_list(&s))
                .unwrap_or_default(),
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            max_message_age: Duration::from_secs(
                env::var("EVENTSUB_MAX_MESSAGE_AGE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(600), // 10 minutes
            ),
            credential_seed: CredentialSeed {
                api_key: non_empty("TWITCH_API_KEY"),
                websocket_secret: non_empty("TWITCH_WEBSOCKET_SECRET"),
                webhook_url: non_empty("EVENTSUB_WEBHOOK_URL"),
                webhook_secret: non_empty("EVENTSUB_WEBHOOK_SECRET"),
            },
            dispatch: DispatchConfig::from_env(),
        })
    }

    /// Check if a persistent store is configured.
    #[must_use]
    pub const fn has_redis(&self) -> bool {
        self.redis_url.is_some()
    }

    /// Create a default configuration for testing.
    ///
    /// Uses the in-memory store and a Discord base URL that is never reached.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".into(),
            redis_url: None,
            store_prefix: "eventsub-test".into(),
            discord_bot_token: "test-token".into(),
            discord_api_base: "http://127.0.0.1:9".into(),
            owner_ids: vec!["100".into()],
            max_body_bytes: 1024 * 1024,
            max_message_age: Duration::from_secs(600),
            credential_seed: CredentialSeed::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}
