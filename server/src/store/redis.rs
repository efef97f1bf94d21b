//! Redis-backed configuration store.

use anyhow::Result;
use async_trait::async_trait;
use fred::prelude::*;
use tracing::info;

use super::{ConfigStore, StoreError};

/// Create Redis client.
pub async fn create_redis_client(redis_url: &str) -> Result<Client> {
    let config = Config::from_url(redis_url)?;
    let client = Client::new(config, None, None, None);
    client.connect();
    client.wait_for_connect().await?;

    info!("Connected to Redis");
    Ok(client)
}

/// Persistent [`ConfigStore`] using plain `GET` / `SET` / `DEL`.
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

fn backend(e: &Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl ConfigStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.client
            .get::<Option<String>, _>(key)
            .await
            .map_err(|e| backend(&e))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.client
            .set::<(), _, _>(key, value, None, None, false)
            .await
            .map_err(|e| backend(&e))
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let removed: i64 = self.client.del(key).await.map_err(|e| backend(&e))?;
        Ok(removed > 0)
    }
}
