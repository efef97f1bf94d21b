//! Configuration Store
//!
//! Persistent key-value storage for subscription rules and credentials.
//! The registry and credentials store only ever talk to [`ConfigStore`],
//! so tests run against [`MemoryStore`] and production against Redis.

mod memory;
mod redis;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use redis::{create_redis_client, RedisStore};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or rejected the command.
    #[error("Store backend error: {0}")]
    Backend(String),

    /// A stored value could not be decoded.
    #[error("Corrupt value under {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Key-value storage owned by the host process.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read a value, `None` if the key is unset.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Delete a key. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;
}

/// Builds namespaced storage keys (e.g. `eventsub:webhook:url`).
#[derive(Debug, Clone)]
pub struct KeySpace {
    prefix: String,
}

impl KeySpace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Full key for a relative name.
    pub fn key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}:{name}", self.prefix)
        }
    }
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new("eventsub")
    }
}
