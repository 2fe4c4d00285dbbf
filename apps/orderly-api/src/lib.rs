//! # Orderly API
//!
//! HTTP server for order management.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Orderly API                                    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  AuthService   │  │  OrderService  │  │  HealthService             ││
//! │  │                │  │                │  │                            ││
//! │  │ • issue_token  │  │ • orders CRUD  │  │ • database                 ││
//! │  │ • verify_token │  │ • order lines  │  │ • broker (optional)        ││
//! │  │                │  │ • products     │  │                            ││
//! │  └────────────────┘  └───────┬────────┘  └────────────────────────────┘│
//! │                              │                                          │
//! │  ┌───────────────────────────▼──────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────────┐│  │
//! │  │  │  SQLite      │  │  EventPublisher  │  │  JWT (HS256)         ││  │
//! │  │  │  orderly-db  │  │  Redis / log     │  │  Argon2 credentials  ││  │
//! │  │  └──────────────┘  └──────────────────┘  └──────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`ApiConfig`]):
//! - `DATABASE_URL` - SQLite connection string (default: `sqlite://./order.db`)
//! - `HTTP_PORT` - HTTP server port (default: 8000)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_ACCESS_LIFETIME_SECS` - Access token lifetime (default: 1800)
//! - `REDIS_URL` - Redis connection string; events are only logged without it

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod publisher;
pub mod services;

use std::sync::Arc;

use orderly_db::Database;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use publisher::EventPublisher;

use auth::AuthError;
use publisher::RedisPublisher;
use services::{AuthService, HealthService, OrderService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub auth: Arc<AuthService>,
    pub orders: OrderService,
    pub health: HealthService,
}

impl AppState {
    /// Wires the services around an open database and a chosen publisher.
    ///
    /// `broker` is only consulted by the health check.
    pub fn new(
        config: ApiConfig,
        db: Database,
        publisher: Arc<dyn EventPublisher>,
        broker: Option<Arc<RedisPublisher>>,
    ) -> Result<Self, AuthError> {
        let auth = AuthService::from_config(&config)?;

        Ok(AppState {
            config: Arc::new(config),
            auth: Arc::new(auth),
            orders: OrderService::new(db.clone(), publisher),
            health: HealthService::new(db, broker),
        })
    }
}

/// Builds the HTTP application.
pub fn app(state: AppState) -> axum::Router {
    api::router(state)
}
