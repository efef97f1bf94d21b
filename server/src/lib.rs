//! `EventSub Relay` Server
//!
//! Receives Twitch EventSub webhooks, verifies them against the configured
//! secret and posts templated messages to Discord channels according to
//! owner-managed subscription rules.

pub mod api;
pub mod config;
pub mod credentials;
pub mod discord;
pub mod dispatch;
pub mod error;
pub mod permissions;
pub mod store;
pub mod subscriptions;
pub mod webhooks;
