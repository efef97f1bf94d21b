//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum
//! router on top of the in-memory store, plus a recording chat client and
//! EventSub signing utilities.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;

use eventsub_relay::api::{create_router, AppState};
use eventsub_relay::config::Config;
use eventsub_relay::dispatch::{ChatClient, ChatError};
use eventsub_relay::permissions::{Actor, OwnerCapability};
use eventsub_relay::store::MemoryStore;
use eventsub_relay::subscriptions::ChannelId;
use eventsub_relay::webhooks::handlers::{
    MESSAGE_ID_HEADER, MESSAGE_SIGNATURE_HEADER, MESSAGE_TIMESTAMP_HEADER, MESSAGE_TYPE_HEADER,
};
use eventsub_relay::webhooks::signing::{sign_payload, signed_message};

/// Webhook secret installed by [`TestApp::with_secret`].
pub const TEST_SECRET: &str = "s3cr3t-webhook-secret";

/// Owner id present in `Config::default_for_test()`.
pub const TEST_OWNER: &str = "100";

/// Chat client that records every message instead of sending it.
#[derive(Default)]
pub struct RecordingChat {
    sent: Mutex<Vec<(ChannelId, String)>>,
}

impl RecordingChat {
    pub fn sent(&self) -> Vec<(ChannelId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for RecordingChat {
    async fn send_message(&self, channel: &ChannelId, content: &str) -> Result<(), ChatError> {
        self.sent
            .lock()
            .unwrap()
            .push((channel.clone(), content.to_string()));
        Ok(())
    }
}

/// Router plus handles into its state.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub chat: Arc<RecordingChat>,
}

impl TestApp {
    /// Create a test app with no credentials and no subscriptions.
    pub fn new() -> Self {
        Self::with_config(Config::default_for_test())
    }

    /// Create a test app with a custom config.
    pub fn with_config(config: Config) -> Self {
        let chat = Arc::new(RecordingChat::default());
        let state = AppState::new(config, Arc::new(MemoryStore::new()), chat.clone());
        let router = create_router(state.clone());

        Self {
            router,
            state,
            chat,
        }
    }

    /// Create a test app whose webhook secret is [`TEST_SECRET`].
    pub async fn with_secret() -> Self {
        let app = Self::new();
        app.state
            .credentials
            .set_webhook_secret(&app.owner(), TEST_SECRET)
            .await
            .expect("Failed to set webhook secret");
        app
    }

    /// Capability for the configured test owner.
    pub fn owner(&self) -> OwnerCapability {
        self.state
            .owners
            .authorize(&Actor::User(TEST_OWNER.into()))
            .expect("test owner must be authorized")
    }

    /// Register an enabled subscription.
    pub async fn subscribe(&self, event_type: &str, channel: u64, template: &str) {
        self.state
            .registry
            .add(&self.owner(), event_type, ChannelId::from(channel), template)
            .await
            .expect("Failed to add subscription");
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> axum::http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Wait until at least `count` messages were sent, or panic after 5s.
    pub async fn wait_for_messages(&self, count: usize) -> Vec<(ChannelId, String)> {
        for _ in 0..100 {
            let sent = self.chat.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("expected {count} messages, got {}", self.chat.sent().len());
    }
}

/// A signed EventSub request under construction.
pub struct EventSubRequest {
    pub message_id: String,
    pub timestamp: String,
    pub message_type: Option<&'static str>,
    pub body: String,
    /// Overrides the computed signature when set.
    pub signature: Option<String>,
    pub secret: String,
}

impl EventSubRequest {
    pub fn new(message_type: &'static str, body: serde_json::Value) -> Self {
        Self {
            message_id: next_message_id(),
            timestamp: Utc::now().to_rfc3339(),
            message_type: Some(message_type),
            body: body.to_string(),
            signature: None,
            secret: TEST_SECRET.to_string(),
        }
    }

    pub fn notification(event_type: &str, event: serde_json::Value) -> Self {
        Self::new(
            "notification",
            serde_json::json!({
                "subscription": {
                    "id": "f1c2a387-161a-49f9-a165-0f21d7a4e1c4",
                    "type": event_type,
                    "status": "enabled",
                },
                "event": event,
            }),
        )
    }

    pub fn signature(&self) -> String {
        self.signature.clone().unwrap_or_else(|| {
            sign_payload(
                &self.secret,
                &signed_message(&self.message_id, &self.timestamp, self.body.as_bytes()),
            )
        })
    }

    pub fn build(&self) -> Request<Body> {
        let mut builder = TestApp::request(Method::POST, "/webhooks/eventsub")
            .header("content-type", "application/json")
            .header(MESSAGE_ID_HEADER, &self.message_id)
            .header(MESSAGE_TIMESTAMP_HEADER, &self.timestamp)
            .header(MESSAGE_SIGNATURE_HEADER, self.signature());
        if let Some(kind) = self.message_type {
            builder = builder.header(MESSAGE_TYPE_HEADER, kind);
        }
        builder
            .body(Body::from(self.body.clone()))
            .expect("Failed to build request")
    }
}

/// Unique enough message id for one test binary.
fn next_message_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static NEXT: AtomicU64 = AtomicU64::new(1);
    format!("msg-{}-{}", std::process::id(), NEXT.fetch_add(1, Ordering::Relaxed))
}

/// Parse a response body as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}

/// Collect a response body as text.
pub async fn body_to_string(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}
