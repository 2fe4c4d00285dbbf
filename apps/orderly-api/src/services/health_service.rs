//! Liveness of the database and, when configured, the broker.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use orderly_db::Database;
use serde::Serialize;

use crate::publisher::RedisPublisher;

/// Result of a health check.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `ok`, `degraded` (broker down) or `unavailable` (database down).
    pub status: &'static str,
    pub database: bool,
    /// `None` when no broker is configured.
    pub broker: Option<bool>,
    pub version: &'static str,
    pub server_time: DateTime<Utc>,
}

impl HealthReport {
    pub fn is_serving(&self) -> bool {
        self.database
    }
}

#[derive(Debug, Clone)]
pub struct HealthService {
    db: Database,
    broker: Option<Arc<RedisPublisher>>,
}

impl HealthService {
    pub fn new(db: Database, broker: Option<Arc<RedisPublisher>>) -> Self {
        HealthService { db, broker }
    }

    pub async fn check(&self) -> HealthReport {
        let database = self.db.health_check().await;

        let broker = match &self.broker {
            Some(redis) => Some(redis.ping().await),
            None => None,
        };

        // The broker is optional, so losing it only degrades
        let status = match (database, broker) {
            (false, _) => "unavailable",
            (true, Some(false)) => "degraded",
            (true, _) => "ok",
        };

        HealthReport {
            status,
            database,
            broker,
            version: env!("CARGO_PKG_VERSION"),
            server_time: Utc::now(),
        }
    }
}
