//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Signing secret used when `JWT_SECRET` is unset. Development only.
pub const DEV_JWT_SECRET: &str = "orderly-dev-secret-change-in-production";

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Interface to bind
    pub http_host: String,

    /// HTTP server port
    pub http_port: u16,

    /// sqlx SQLite connection URL
    pub database_url: String,

    /// Pool size
    pub db_max_connections: u32,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// The single account allowed to request tokens
    pub auth_username: String,

    /// Its password (hashed at startup, never stored in plaintext afterwards)
    #[serde(skip_serializing)]
    pub auth_password: String,

    /// Redis connection string (optional; events are only logged without it)
    pub redis_url: Option<String>,

    /// Pub/sub channel for order events
    pub event_topic: String,

    /// Per-attempt acknowledgement timeout for a publish, in milliseconds
    pub publish_ack_timeout_ms: u64,

    /// Extra publish attempts after the first one fails
    pub publish_max_retries: u32,

    /// Deadline for a whole HTTP request, in seconds
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = ApiConfig {
            http_host: var("HTTP_HOST", "127.0.0.1"),

            http_port: parse(&lookup, "HTTP_PORT", "8000")?,

            database_url: var("DATABASE_URL", "sqlite://./order.db"),

            db_max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", "5")?,

            jwt_secret: var("JWT_SECRET", DEV_JWT_SECRET),

            jwt_access_lifetime_secs: parse(&lookup, "JWT_ACCESS_LIFETIME_SECS", "1800")?, // 30 minutes

            auth_username: var("AUTH_USERNAME", "user"),

            auth_password: var("AUTH_PASSWORD", "password"),

            redis_url: lookup("REDIS_URL").filter(|url| !url.trim().is_empty()),

            event_topic: var("EVENT_TOPIC", "orders"),

            publish_ack_timeout_ms: parse(&lookup, "PUBLISH_ACK_TIMEOUT_MS", "1000")?,

            publish_max_retries: parse(&lookup, "PUBLISH_MAX_RETRIES", "0")?,

            request_timeout_secs: parse(&lookup, "REQUEST_TIMEOUT_SECS", "30")?,
        };

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        if config.jwt_access_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_ACCESS_LIFETIME_SECS".to_string()));
        }
        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        if config.auth_username.is_empty() {
            return Err(ConfigError::MissingRequired("AUTH_USERNAME".to_string()));
        }

        Ok(config)
    }

    /// Whether the development signing secret is in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn publish_ack_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_ack_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse<T, F>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
