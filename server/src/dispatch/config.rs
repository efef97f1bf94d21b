//! Dispatch configuration.

use std::time::Duration;

/// How unresolved template placeholders are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderPolicy {
    /// Render unresolved placeholders as an empty string.
    #[default]
    Empty,
    /// Fail the render; the event is logged and dropped.
    Strict,
}

impl PlaceholderPolicy {
    /// Parse from a string (`"empty"` or `"strict"`).
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty" => Some(Self::Empty),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// Bounded exponential backoff for chat delivery.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_backoff: Duration,
    /// Upper bound for any single delay
    pub max_backoff: Duration,
    /// Timeout applied to every attempt
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after `failed_attempts` consecutive failures.
    ///
    /// 1 → initial, 2 → 2x initial, 3 → 4x initial, ... capped at `max_backoff`.
    pub fn backoff_for(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}

/// Configuration for the event dispatcher.
#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    pub retry: RetryPolicy,
    pub missing_placeholders: PlaceholderPolicy,
}

impl DispatchConfig {
    /// Creates configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DELIVERY_MAX_ATTEMPTS`: Total send attempts per event (default: 3, min: 1)
    /// - `DELIVERY_INITIAL_BACKOFF_MS`: First retry delay (default: 500)
    /// - `DELIVERY_MAX_BACKOFF_MS`: Retry delay cap (default: 8000)
    /// - `DELIVERY_ATTEMPT_TIMEOUT_SECS`: Per-attempt timeout (default: 10)
    /// - `TEMPLATE_MISSING_PLACEHOLDERS`: `empty` or `strict` (default: empty)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(val) = env_parse::<u32>("DELIVERY_MAX_ATTEMPTS") {
            config.retry.max_attempts = val.max(1);
        }
        if let Some(val) = env_parse::<u64>("DELIVERY_INITIAL_BACKOFF_MS") {
            config.retry.initial_backoff = Duration::from_millis(val);
        }
        if let Some(val) = env_parse::<u64>("DELIVERY_MAX_BACKOFF_MS") {
            config.retry.max_backoff = Duration::from_millis(val);
        }
        if let Some(val) = env_parse::<u64>("DELIVERY_ATTEMPT_TIMEOUT_SECS") {
            config.retry.attempt_timeout = Duration::from_secs(val.max(1));
        }
        if let Ok(val) = std::env::var("TEMPLATE_MISSING_PLACEHOLDERS") {
            match PlaceholderPolicy::parse_str(&val) {
                Some(policy) => config.missing_placeholders = policy,
                None => tracing::warn!(
                    value = %val,
                    "Unknown TEMPLATE_MISSING_PLACEHOLDERS value, using default"
                ),
            }
        }

        config
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
