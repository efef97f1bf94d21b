//! Subscription Registry
//!
//! Event type → delivery rule mapping, persisted in the configuration store.

pub mod registry;
pub mod types;

pub use registry::{SubscriptionRegistry, Subscriptions};
pub use types::{ChannelId, SubscriptionRule};
