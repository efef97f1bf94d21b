//! Subscription registry backed by the configuration store.
//!
//! All rules live in one JSON document (an ordered array) under
//! `{prefix}:event_subscriptions`. Every operation is a read-modify-write of
//! that document inside a single async mutex, so concurrent admin edits and
//! dispatch reads never interleave.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::types::{validate_event_type, ChannelId, SubscriptionRule};
use crate::error::{ConfigError, ConfigResult};
use crate::permissions::OwnerCapability;
use crate::store::{ConfigStore, KeySpace, StoreError};

const SUBSCRIPTIONS_KEY: &str = "event_subscriptions";

/// One stored entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSubscription {
    event_type: String,
    #[serde(flatten)]
    rule: SubscriptionRule,
}

/// Snapshot of the registry in insertion order.
///
/// Iterating is lazy and can be restarted any number of times.
#[derive(Debug, Clone, Default)]
pub struct Subscriptions {
    entries: Vec<StoredSubscription>,
}

impl Subscriptions {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SubscriptionRule)> + '_ {
        self.entries
            .iter()
            .map(|entry| (entry.event_type.as_str(), &entry.rule))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Subscriptions {
    type Item = (&'a str, &'a SubscriptionRule);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Event type → rule registry.
pub struct SubscriptionRegistry {
    store: Arc<dyn ConfigStore>,
    key: String,
    lock: Mutex<()>,
}

impl SubscriptionRegistry {
    pub fn new(store: Arc<dyn ConfigStore>, keys: &KeySpace) -> Self {
        Self {
            store,
            key: keys.key(SUBSCRIPTIONS_KEY),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<StoredSubscription>, StoreError> {
        match self.store.get(&self.key).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                key: self.key.clone(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, entries: &[StoredSubscription]) -> Result<(), StoreError> {
        if entries.is_empty() {
            self.store.delete(&self.key).await?;
            return Ok(());
        }
        let raw = serde_json::to_string(entries).map_err(|source| StoreError::Corrupt {
            key: self.key.clone(),
            source,
        })?;
        self.store.set(&self.key, raw).await
    }

    /// Insert or replace the rule for an event type.
    ///
    /// Replacing keeps the entry's original position.
    pub async fn put(
        &self,
        cap: &OwnerCapability,
        event_type: &str,
        rule: SubscriptionRule,
    ) -> ConfigResult<()> {
        validate_event_type(event_type)?;
        rule.validate()?;

        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        match entries.iter_mut().find(|e| e.event_type == event_type) {
            Some(existing) => existing.rule = rule,
            None => entries.push(StoredSubscription {
                event_type: event_type.to_string(),
                rule,
            }),
        }
        self.save(&entries).await?;

        info!(event_type, actor = %cap.actor(), "Subscription added or updated");
        Ok(())
    }

    /// Add or update an enabled subscription.
    pub async fn add(
        &self,
        cap: &OwnerCapability,
        event_type: &str,
        channel: ChannelId,
        message_template: &str,
    ) -> ConfigResult<()> {
        self.put(cap, event_type, SubscriptionRule::new(channel, message_template))
            .await
    }

    /// Remove a subscription. Returns whether one existed.
    pub async fn remove(&self, cap: &OwnerCapability, event_type: &str) -> ConfigResult<bool> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        let before = entries.len();
        entries.retain(|e| e.event_type != event_type);
        if entries.len() == before {
            debug!(event_type, "No subscription to remove");
            return Ok(false);
        }
        self.save(&entries).await?;

        info!(event_type, actor = %cap.actor(), "Subscription removed");
        Ok(true)
    }

    /// Enable or disable a subscription. Returns whether one existed.
    pub async fn set_enabled(
        &self,
        cap: &OwnerCapability,
        event_type: &str,
        enabled: bool,
    ) -> ConfigResult<bool> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        let Some(entry) = entries.iter_mut().find(|e| e.event_type == event_type) else {
            return Ok(false);
        };
        if entry.rule.enabled != enabled {
            entry.rule.enabled = enabled;
            self.save(&entries).await?;
        }

        info!(event_type, enabled, actor = %cap.actor(), "Subscription toggled");
        Ok(true)
    }

    /// Look up the rule for an event type.
    pub async fn get(&self, event_type: &str) -> ConfigResult<Option<SubscriptionRule>> {
        let _guard = self.lock.lock().await;
        let entries = self.load().await?;
        Ok(entries
            .into_iter()
            .find(|e| e.event_type == event_type)
            .map(|e| e.rule))
    }

    /// Like [`get`](Self::get), but a missing rule is an error.
    pub async fn require(&self, event_type: &str) -> ConfigResult<SubscriptionRule> {
        self.get(event_type)
            .await?
            .ok_or_else(|| ConfigError::NotFound(event_type.to_string()))
    }

    /// All rules in insertion order.
    pub async fn list(&self) -> ConfigResult<Subscriptions> {
        let _guard = self.lock.lock().await;
        Ok(Subscriptions {
            entries: self.load().await?,
        })
    }
}
