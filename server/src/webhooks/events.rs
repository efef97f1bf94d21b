//! EventSub Message Types & Inbound Events
//!
//! Twitch sends three kinds of webhook messages, named by the
//! `Twitch-Eventsub-Message-Type` header. Notification bodies are accepted
//! both in the Twitch envelope (`subscription.type` + `event`) and in the
//! flat `{eventType, payload}` form.

use serde::Deserialize;
use serde_json::Value;

use super::types::WebhookError;

/// Webhook message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// An event occurred.
    Notification,
    /// Twitch is confirming ownership of the callback URL.
    WebhookCallbackVerification,
    /// Twitch revoked the subscription.
    Revocation,
}

impl MessageType {
    /// Parse from the header value (e.g., `"notification"`).
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "notification" => Some(Self::Notification),
            "webhook_callback_verification" => Some(Self::WebhookCallbackVerification),
            "revocation" => Some(Self::Revocation),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Notification => "notification",
            Self::WebhookCallbackVerification => "webhook_callback_verification",
            Self::Revocation => "revocation",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verified notification, alive for one verify-and-dispatch cycle.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub event_type: String,
    pub payload: Value,
    pub signature: String,
}

/// Subscription metadata inside Twitch bodies.
#[derive(Debug, Deserialize)]
pub struct SubscriptionInfo {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NotificationBody {
    Twitch {
        subscription: SubscriptionInfo,
        event: Value,
    },
    Flat {
        #[serde(alias = "eventType")]
        event_type: String,
        payload: Value,
    },
}

#[derive(Debug, Deserialize)]
struct ChallengeBody {
    challenge: String,
}

#[derive(Debug, Deserialize)]
struct RevocationBody {
    subscription: SubscriptionInfo,
}

/// Parse a notification body into an [`InboundEvent`].
pub fn parse_notification(body: &[u8], signature: &str) -> Result<InboundEvent, WebhookError> {
    let parsed: NotificationBody = serde_json::from_slice(body).map_err(|_| {
        WebhookError::Validation(
            "Body must contain `subscription.type` and `event`, or `eventType` and `payload`"
                .to_string(),
        )
    })?;

    let (event_type, payload) = match parsed {
        NotificationBody::Twitch {
            subscription,
            event,
        } => (subscription.kind, event),
        NotificationBody::Flat {
            event_type,
            payload,
        } => (event_type, payload),
    };

    if event_type.trim().is_empty() {
        return Err(WebhookError::Validation(
            "Event type must not be empty".to_string(),
        ));
    }
    if !payload.is_object() {
        return Err(WebhookError::Validation(
            "Event payload must be a JSON object".to_string(),
        ));
    }

    Ok(InboundEvent {
        event_type,
        payload,
        signature: signature.to_string(),
    })
}

/// Extract the challenge string from a callback verification body.
pub fn parse_challenge(body: &[u8]) -> Result<String, WebhookError> {
    let parsed: ChallengeBody = serde_json::from_slice(body).map_err(|_| {
        WebhookError::Validation("Verification body must contain `challenge`".to_string())
    })?;
    Ok(parsed.challenge)
}

/// Extract subscription metadata from a revocation body.
pub fn parse_revocation(body: &[u8]) -> Result<SubscriptionInfo, WebhookError> {
    let parsed: RevocationBody = serde_json::from_slice(body).map_err(|_| {
        WebhookError::Validation("Revocation body must contain `subscription`".to_string())
    })?;
    Ok(parsed.subscription)
}
