//! Credentials Store
//!
//! Singleton Twitch and webhook secrets kept in the configuration store.
//! Unset fields read as empty strings. Secrets never appear in `Debug`
//! output or in logs.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::permissions::OwnerCapability;
use crate::store::{ConfigStore, KeySpace};

const API_KEY: &str = "twitch_api_key";
const WEBSOCKET_SECRET: &str = "twitch_websocket_secret";
const WEBHOOK_URL: &str = "webhook:url";
const WEBHOOK_SECRET: &str = "webhook:secret";

/// Snapshot of all credential fields.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub websocket_secret: String,
    pub webhook_url: String,
    pub webhook_secret: String,
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &redact(&self.api_key))
            .field("websocket_secret", &redact(&self.websocket_secret))
            .field("webhook_url", &self.webhook_url)
            .field("webhook_secret", &redact(&self.webhook_secret))
            .finish()
    }
}

/// Values to seed at startup, typically from the environment.
#[derive(Clone, Default)]
pub struct CredentialSeed {
    pub api_key: Option<String>,
    pub websocket_secret: Option<String>,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
}

impl fmt::Debug for CredentialSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSeed")
            .field("api_key", &self.api_key.is_some())
            .field("websocket_secret", &self.websocket_secret.is_some())
            .field("webhook_url", &self.webhook_url)
            .field("webhook_secret", &self.webhook_secret.is_some())
            .finish()
    }
}

/// Validate a webhook callback URL.
fn validate_url(url: &str) -> Result<(), ConfigError> {
    if url.len() < 10 || url.len() > 2048 {
        return Err(ConfigError::Validation(
            "URL must be between 10 and 2048 characters".to_string(),
        ));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "URL must start with http:// or https://".to_string(),
        ));
    }

    let parsed = reqwest::Url::parse(url)
        .map_err(|_| ConfigError::Validation("Invalid URL format".to_string()))?;
    if parsed.host_str().is_none() {
        return Err(ConfigError::Validation(
            "URL must contain a host".to_string(),
        ));
    }

    Ok(())
}

fn validate_secret(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{name} must not be empty")));
    }
    Ok(())
}

/// Reads and writes the credential fields.
pub struct CredentialsStore {
    store: Arc<dyn ConfigStore>,
    keys: KeySpace,
}

impl CredentialsStore {
    pub const fn new(store: Arc<dyn ConfigStore>, keys: KeySpace) -> Self {
        Self { store, keys }
    }

    async fn read(&self, name: &str) -> ConfigResult<String> {
        Ok(self
            .store
            .get(&self.keys.key(name))
            .await?
            .unwrap_or_default())
    }

    async fn write(&self, cap: &OwnerCapability, name: &str, value: &str) -> ConfigResult<()> {
        self.store.set(&self.keys.key(name), value.to_string()).await?;
        info!(field = name, actor = %cap.actor(), "Credential updated");
        Ok(())
    }

    /// Read all credential fields.
    pub async fn get(&self) -> ConfigResult<Credentials> {
        Ok(Credentials {
            api_key: self.read(API_KEY).await?,
            websocket_secret: self.read(WEBSOCKET_SECRET).await?,
            webhook_url: self.read(WEBHOOK_URL).await?,
            webhook_secret: self.read(WEBHOOK_SECRET).await?,
        })
    }

    /// Current webhook signing secret, `None` if unset.
    pub async fn webhook_secret(&self) -> ConfigResult<Option<String>> {
        let secret = self.read(WEBHOOK_SECRET).await?;
        Ok((!secret.is_empty()).then_some(secret))
    }

    pub async fn set_api_key(&self, cap: &OwnerCapability, api_key: &str) -> ConfigResult<()> {
        validate_secret("API key", api_key)?;
        self.write(cap, API_KEY, api_key).await
    }

    pub async fn set_websocket_secret(
        &self,
        cap: &OwnerCapability,
        secret: &str,
    ) -> ConfigResult<()> {
        validate_secret("WebSocket secret", secret)?;
        self.write(cap, WEBSOCKET_SECRET, secret).await
    }

    pub async fn set_webhook_url(&self, cap: &OwnerCapability, url: &str) -> ConfigResult<()> {
        validate_url(url)?;
        self.write(cap, WEBHOOK_URL, url).await
    }

    pub async fn set_webhook_secret(
        &self,
        cap: &OwnerCapability,
        secret: &str,
    ) -> ConfigResult<()> {
        validate_secret("Webhook secret", secret)?;
        self.write(cap, WEBHOOK_SECRET, secret).await
    }

    /// Write seed values for fields that are still unset.
    ///
    /// Every seed value is validated before the first write, so an invalid
    /// seed leaves the store untouched. Returns the number of fields written.
    pub async fn seed(&self, cap: &OwnerCapability, seed: &CredentialSeed) -> ConfigResult<usize> {
        if let Some(value) = seed.api_key.as_deref() {
            validate_secret("API key", value)?;
        }
        if let Some(value) = seed.websocket_secret.as_deref() {
            validate_secret("WebSocket secret", value)?;
        }
        if let Some(value) = seed.webhook_url.as_deref() {
            validate_url(value)?;
        }
        if let Some(value) = seed.webhook_secret.as_deref() {
            validate_secret("Webhook secret", value)?;
        }

        let current = self.get().await?;
        let pending = [
            (API_KEY, seed.api_key.as_deref(), current.api_key.is_empty()),
            (
                WEBSOCKET_SECRET,
                seed.websocket_secret.as_deref(),
                current.websocket_secret.is_empty(),
            ),
            (WEBHOOK_URL, seed.webhook_url.as_deref(), current.webhook_url.is_empty()),
            (
                WEBHOOK_SECRET,
                seed.webhook_secret.as_deref(),
                current.webhook_secret.is_empty(),
            ),
        ];

        let mut written = 0;
        for (name, value, unset) in pending {
            if let (Some(value), true) = (value, unset) {
                self.write(cap, name, value).await?;
                written += 1;
            }
        }

        Ok(written)
    }
}
