//! EventSub Webhooks
//!
//! Inbound Twitch EventSub webhook endpoint with HMAC verification,
//! timestamp freshness checks and replay protection.

pub mod events;
pub mod handlers;
pub mod replay;
pub mod signing;
pub mod types;

pub use events::{InboundEvent, MessageType};
pub use replay::ReplayGuard;
pub use types::WebhookError;
