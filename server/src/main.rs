//! `EventSub Relay` Server - Main Entry Point
//!
//! Twitch EventSub to Discord relay.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use eventsub_relay::{api, config, discord, permissions::Actor, store};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventsub_relay=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting EventSub Relay"
    );

    // Initialize configuration store
    let store: Arc<dyn store::ConfigStore> = match config.redis_url.as_deref() {
        Some(url) => {
            let redis = store::create_redis_client(url).await?;
            Arc::new(store::RedisStore::new(redis))
        }
        None => {
            warn!("REDIS_URL not set. Subscriptions and credentials will not survive a restart.");
            Arc::new(store::MemoryStore::new())
        }
    };

    // Initialize Discord client
    let chat = discord::DiscordClient::new(
        config.discord_bot_token.clone(),
        config.discord_api_base.clone(),
    )
    .context("Failed to build Discord HTTP client")?;

    // Build application state
    let state = api::AppState::new(config.clone(), store, Arc::new(chat));

    // Seed credentials from the environment
    let system = state.owners.authorize(&Actor::System)?;
    let seeded = state
        .credentials
        .seed(&system, &config.credential_seed)
        .await
        .context("Failed to seed credentials")?;
    if seeded > 0 {
        info!(fields = seeded, "Seeded credentials from environment");
    }

    let subscriptions = state.registry.list().await?;
    info!(count = subscriptions.len(), "Loaded EventSub subscriptions");
    for (event_type, rule) in &subscriptions {
        info!(
            event_type,
            enabled = rule.enabled,
            channel = %rule.target_channel,
            "Subscription"
        );
    }

    if state.credentials.webhook_secret().await?.is_none() {
        warn!("Webhook secret not configured. All EventSub notifications will be rejected.");
    }

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
