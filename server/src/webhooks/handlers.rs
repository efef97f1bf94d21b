//! EventSub Webhook Handler
//!
//! `POST /webhooks/eventsub`. Verification runs before anything reads the
//! body; notifications are queued for dispatch and acknowledged right away.
//!
//! Responses:
//! - `200` accepted (queued, duplicate, revocation, or no matching rule; the
//!   rule lookup happens on the dispatch task and a miss is a silent discard)
//! - `200 text/plain` with the challenge for callback verification
//! - `400` malformed body or headers
//! - `401` signature or timestamp check failed

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use super::events::{parse_challenge, parse_notification, parse_revocation, MessageType};
use super::signing::{signed_message, verify_signature};
use super::types::WebhookError;
use crate::api::AppState;

pub const MESSAGE_ID_HEADER: &str = "twitch-eventsub-message-id";
pub const MESSAGE_TIMESTAMP_HEADER: &str = "twitch-eventsub-message-timestamp";
pub const MESSAGE_SIGNATURE_HEADER: &str = "twitch-eventsub-message-signature";
pub const MESSAGE_TYPE_HEADER: &str = "twitch-eventsub-message-type";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Reject messages whose timestamp is further than `max_age` from `now`.
fn check_freshness(
    timestamp: &str,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Result<(), WebhookError> {
    let sent_at = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|_| WebhookError::Validation("Invalid message timestamp".to_string()))?
        .with_timezone(&Utc);

    let age = (now - sent_at).abs();
    let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
    if age > max_age {
        return Err(WebhookError::Stale);
    }
    Ok(())
}

fn status(value: &'static str) -> Response {
    (StatusCode::OK, Json(serde_json::json!({ "status": value }))).into_response()
}

/// POST /webhooks/eventsub
#[instrument(skip(state, headers, body))]
pub async fn receive_eventsub(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookError> {
    let message_id = header_str(&headers, MESSAGE_ID_HEADER);
    let timestamp = header_str(&headers, MESSAGE_TIMESTAMP_HEADER);
    let signature = header_str(&headers, MESSAGE_SIGNATURE_HEADER);

    let secret = state.credentials.webhook_secret().await?;
    let message = signed_message(message_id.unwrap_or(""), timestamp.unwrap_or(""), &body);
    if let Err(e) = verify_signature(secret.as_deref(), &message, signature) {
        warn!(reason = %e, message_id = ?message_id, "Rejected EventSub webhook");
        return Err(e.into());
    }

    if let Some(timestamp) = timestamp {
        if let Err(e) = check_freshness(timestamp, Utc::now(), state.config.max_message_age) {
            warn!(message_id = ?message_id, timestamp, "Rejected EventSub webhook: {}", e);
            return Err(e);
        }
    }

    let message_type = match header_str(&headers, MESSAGE_TYPE_HEADER) {
        None => MessageType::Notification,
        Some(value) => MessageType::parse_str(value).ok_or_else(|| {
            WebhookError::Validation(format!("Unknown message type `{value}`"))
        })?,
    };

    match message_type {
        MessageType::WebhookCallbackVerification => {
            let challenge = parse_challenge(&body)?;
            info!("Answered EventSub callback verification");
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain")],
                challenge,
            )
                .into_response())
        }
        MessageType::Revocation => {
            let subscription = parse_revocation(&body)?;
            warn!(
                event_type = %subscription.kind,
                status = ?subscription.status,
                "EventSub subscription revoked"
            );
            Ok(status("acknowledged"))
        }
        MessageType::Notification => {
            let event = parse_notification(&body, signature.unwrap_or_default())?;

            if let Some(id) = message_id {
                if !state.replay.first_seen(id) {
                    info!(
                        message_id = id,
                        event_type = %event.event_type,
                        "Duplicate EventSub message ignored"
                    );
                    return Ok(status("duplicate"));
                }
            }

            state.dispatcher.spawn(event);
            Ok(status("queued"))
        }
    }
}
