//! API Router and Application State
//!
//! Central routing configuration and shared state.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::credentials::CredentialsStore;
use crate::dispatch::{ChatClient, Dispatcher};
use crate::permissions::OwnerPolicy;
use crate::store::{ConfigStore, KeySpace};
use crate::subscriptions::SubscriptionRegistry;
use crate::webhooks::{handlers, ReplayGuard};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Event type → rule registry
    pub registry: Arc<SubscriptionRegistry>,
    /// Twitch and webhook credentials
    pub credentials: Arc<CredentialsStore>,
    /// Owner check for configuration changes
    pub owners: Arc<OwnerPolicy>,
    /// Routes verified events to chat
    pub dispatcher: Arc<Dispatcher>,
    /// Recently seen webhook message ids
    pub replay: Arc<ReplayGuard>,
}

impl AppState {
    /// Build the process-lifetime singletons on top of a store and chat client.
    #[must_use]
    pub fn new(config: Config, store: Arc<dyn ConfigStore>, chat: Arc<dyn ChatClient>) -> Self {
        let keys = KeySpace::new(config.store_prefix.clone());
        let registry = Arc::new(SubscriptionRegistry::new(Arc::clone(&store), &keys));
        let credentials = Arc::new(CredentialsStore::new(store, keys));
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&registry),
            chat,
            config.dispatch.clone(),
        ));

        Self {
            owners: Arc::new(OwnerPolicy::new(config.owner_ids.iter().cloned())),
            replay: Arc::new(ReplayGuard::new(config.max_message_age)),
            config: Arc::new(config),
            registry,
            credentials,
            dispatcher,
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Twitch EventSub callback
        .route("/webhooks/eventsub", post(handlers::receive_eventsub))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_body_bytes))
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Whether configuration survives restarts
    persistent_store: bool,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        persistent_store: state.config.has_redis(),
    })
}
