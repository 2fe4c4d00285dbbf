//! # Orderly API Server
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Orderly API Server                               │
//! │                                                                         │
//! │  Client ───► HTTP (8000) ───► Services ───► SQLite                     │
//! │                                   │                                     │
//! │                                   ▼ after commit                        │
//! │                                 Redis                                   │
//! │                               (Pub/Sub)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use orderly_api::publisher::{EventPublisher, LogPublisher, RedisPublisher, RetryPolicy};
use orderly_api::{app, ApiConfig, AppState};
use orderly_db::{Database, DbConfig};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Orderly API server...");

    let config = ApiConfig::load().context("invalid configuration")?;
    info!(
        addr = %config.bind_address(),
        db_url = %config.database_url,
        "Configuration loaded"
    );

    if config.uses_dev_secret() {
        warn!("JWT_SECRET not set, using the development signing secret");
    }

    let db = Database::new(
        DbConfig::new(&config.database_url).max_connections(config.db_max_connections),
    )
    .await
    .context("failed to open database")?;

    // Redis is optional; without it events are only logged
    let policy = RetryPolicy::new(config.publish_ack_timeout(), config.publish_max_retries);
    let broker = match &config.redis_url {
        Some(url) => match RedisPublisher::connect(url, &config.event_topic, policy).await {
            Ok(redis) => Some(Arc::new(redis)),
            Err(e) => {
                warn!(error = %e, "Failed to connect to Redis, continuing without it");
                None
            }
        },
        None => None,
    };

    let publisher: Arc<dyn EventPublisher> = match &broker {
        Some(redis) => redis.clone() as Arc<dyn EventPublisher>,
        None => Arc::new(LogPublisher),
    };

    let state = AppState::new(config.clone(), db.clone(), publisher, broker)
        .context("failed to initialise credentials")?;

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    info!(addr = %config.bind_address(), "Starting HTTP server");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
