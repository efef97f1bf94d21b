//! Event Dispatch
//!
//! Rule lookup, template rendering and chat delivery with bounded retries
//! for verified EventSub notifications.

pub mod chat;
pub mod config;
pub mod delivery;
pub mod dispatcher;
pub mod template;

pub use chat::{ChatClient, ChatError};
pub use config::{DispatchConfig, PlaceholderPolicy, RetryPolicy};
pub use delivery::{deliver, DeliveryError};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use template::{render, TemplateError};
