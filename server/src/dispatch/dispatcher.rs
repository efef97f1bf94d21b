//! Event Dispatcher
//!
//! Looks up the rule for a verified event, renders its template and hands the
//! result to the chat client. Failures are logged and never propagated: one
//! event can not affect another.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::chat::ChatClient;
use super::config::DispatchConfig;
use super::delivery::{deliver, DeliveryError};
use super::template::render;
use crate::subscriptions::SubscriptionRegistry;
use crate::webhooks::events::InboundEvent;

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Sent to the rule's channel.
    Delivered { attempts: u32 },
    /// No rule for the event type.
    NoRule,
    /// Rule exists but is disabled.
    Disabled,
    /// The registry could not be read.
    LookupFailed,
    /// Template could not be rendered under the strict policy.
    RenderFailed,
    /// Delivery failed and the message was dropped.
    Dropped { attempts: u32 },
}

/// Routes verified events to chat channels.
pub struct Dispatcher {
    registry: Arc<SubscriptionRegistry>,
    chat: Arc<dyn ChatClient>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<SubscriptionRegistry>,
        chat: Arc<dyn ChatClient>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            chat,
            config,
        }
    }

    /// Handle one event to completion.
    #[tracing::instrument(skip_all, fields(event_type = %event.event_type))]
    pub async fn handle(&self, event: InboundEvent) -> DispatchOutcome {
        let rule = match self.registry.get(&event.event_type).await {
            Ok(Some(rule)) => rule,
            Ok(None) => {
                debug!("No subscription for event type, discarding");
                return DispatchOutcome::NoRule;
            }
            Err(e) => {
                error!(error = %e, "Failed to look up subscription, dropping event");
                return DispatchOutcome::LookupFailed;
            }
        };

        if !rule.enabled {
            debug!("Subscription disabled, discarding");
            return DispatchOutcome::Disabled;
        }

        let content = match render(
            &rule.message_template,
            &event.payload,
            self.config.missing_placeholders,
        ) {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "Failed to render message template, dropping event");
                return DispatchOutcome::RenderFailed;
            }
        };

        match deliver(
            self.chat.as_ref(),
            &rule.target_channel,
            &content,
            &self.config.retry,
        )
        .await
        {
            Ok(attempts) => {
                info!(channel = %rule.target_channel, attempts, "Event delivered");
                DispatchOutcome::Delivered { attempts }
            }
            Err(e) => {
                let attempts = match &e {
                    DeliveryError::Exhausted { attempts, .. }
                    | DeliveryError::Rejected { attempts, .. } => *attempts,
                };
                error!(channel = %rule.target_channel, error = %e, "Event dropped");
                DispatchOutcome::Dropped { attempts }
            }
        }
    }

    /// Handle an event on a background task.
    ///
    /// The inner task is awaited so a panic is logged instead of lost.
    pub fn spawn(self: &Arc<Self>, event: InboundEvent) {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            let event_type = event.event_type.clone();
            let handle = tokio::spawn(async move { dispatcher.handle(event).await });
            if let Err(e) = handle.await {
                error!(event_type = %event_type, "Dispatch task panicked: {}", e);
            }
        });
    }
}
