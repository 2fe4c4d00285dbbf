//! Order event publishing.
//!
//! The order service hands each committed change to an [`EventPublisher`]
//! and moves on. Delivery happens on a detached task, so a slow or absent
//! broker never delays a response and never undoes a commit.
//!
//! ```text
//! ┌──────────────┐ publish() ┌───────────────────┐ tokio::spawn ┌─────────┐
//! │ OrderService │──────────►│  RedisPublisher   │─────────────►│  Redis  │
//! └──────────────┘ (returns  │  timeout + retry  │  PUBLISH     │ channel │
//!                  at once)  └───────────────────┘              └─────────┘
//! ```
//!
//! Implementations:
//! - [`RedisPublisher`] - Redis pub/sub through a shared `ConnectionManager`
//! - [`LogPublisher`] - no broker configured; events are logged
//! - [`ChannelPublisher`] - in-process subscribers and tests

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use orderly_core::OrderEvent;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Sink for committed order events.
///
/// `publish` must not block and must not fail: delivery problems are the
/// publisher's to log.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: OrderEvent);
}

/// Publishing failures. Logged, never returned to a client.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("no acknowledgement within {0:?}")]
    Timeout(Duration),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

// =============================================================================
// Retry Policy
// =============================================================================

/// Per-attempt timeout plus bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// How long one attempt may wait for the broker.
    pub ack_timeout: Duration,
    /// Attempts after the first. Zero means a single attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles each time.
    pub initial_backoff: Duration,
    /// Upper bound on a single backoff delay.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(ack_timeout: Duration, max_retries: u32) -> Self {
        RetryPolicy {
            ack_timeout,
            max_retries,
            ..RetryPolicy::default()
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            ack_timeout: Duration::from_secs(1),
            max_retries: 0,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
        }
    }
}

/// Runs `attempt` until it succeeds or the policy is exhausted.
///
/// Returns the number of attempts made on success, or the last error.
pub async fn deliver_with_retry<F, Fut>(policy: RetryPolicy, mut attempt: F) -> Result<u32, PublishError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), PublishError>>,
{
    let mut tries = 0;
    loop {
        tries += 1;

        let outcome = match tokio::time::timeout(policy.ack_timeout, attempt()).await {
            Ok(result) => result,
            Err(_) => Err(PublishError::Timeout(policy.ack_timeout)),
        };

        match outcome {
            Ok(()) => return Ok(tries),
            Err(e) if tries > policy.max_retries => return Err(e),
            Err(e) => {
                let delay = policy.backoff(tries);
                debug!(attempt = tries, error = %e, ?delay, "Publish attempt failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

// =============================================================================
// Redis
// =============================================================================

/// Publishes events as JSON on a Redis pub/sub channel.
#[derive(Clone)]
pub struct RedisPublisher {
    conn: ConnectionManager,
    topic: Arc<str>,
    policy: RetryPolicy,
}

impl RedisPublisher {
    /// Opens the shared connection. Fails if the broker can't be reached
    /// within the acknowledgement timeout.
    pub async fn connect(url: &str, topic: &str, policy: RetryPolicy) -> Result<Self, PublishError> {
        let client = redis::Client::open(url)?;
        let conn = tokio::time::timeout(policy.ack_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| PublishError::Timeout(policy.ack_timeout))??;

        info!(%topic, "Connected to Redis");

        Ok(RedisPublisher {
            conn,
            topic: Arc::from(topic),
            policy,
        })
    }

    /// PINGs the broker.
    pub async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .is_ok()
    }
}

impl EventPublisher for RedisPublisher {
    fn publish(&self, event: OrderEvent) {
        let payload = match event.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(event_id = %event.event_id, error = %e, "Dropping unserializable event");
                return;
            }
        };

        let conn = self.conn.clone();
        let topic = self.topic.clone();
        let policy = self.policy;

        tokio::spawn(async move {
            let result = deliver_with_retry(policy, || {
                let mut conn = conn.clone();
                let topic = topic.clone();
                let payload = payload.clone();
                async move {
                    let _receivers: i64 = conn.publish(&*topic, payload).await?;
                    Ok(())
                }
            })
            .await;

            match result {
                Ok(attempts) => debug!(
                    event_id = %event.event_id,
                    kind = %event.kind,
                    attempts,
                    "Event published"
                ),
                Err(e) => warn!(
                    event_id = %event.event_id,
                    kind = %event.kind,
                    error = %e,
                    "Failed to publish event"
                ),
            }
        });
    }
}

impl std::fmt::Debug for RedisPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPublisher")
            .field("topic", &self.topic)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Log-only
// =============================================================================

/// Used when no broker is configured.
#[derive(Debug, Clone, Default)]
pub struct LogPublisher;

impl EventPublisher for LogPublisher {
    fn publish(&self, event: OrderEvent) {
        info!(
            event_id = %event.event_id,
            kind = %event.kind,
            entity_id = event.entity_id,
            order_id = event.order_id,
            "{}",
            event.message
        );
    }
}

// =============================================================================
// In-process channel
// =============================================================================

/// Forwards events into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<OrderEvent>,
}

impl ChannelPublisher {
    /// Creates a publisher and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OrderEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelPublisher { tx }, rx)
    }
}

impl EventPublisher for ChannelPublisher {
    fn publish(&self, event: OrderEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!(event_id = %e.0.event_id, "Event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            ack_timeout: Duration::from_millis(50),
            max_retries,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
        }
    }

    fn broker_down() -> PublishError {
        PublishError::Redis(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "connection refused",
        )))
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
        assert_eq!(policy.backoff(40), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_single_attempt_by_default() {
        let calls = AtomicU32::new(0);

        let result = deliver_with_retry(fast_policy(0), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(broker_down()) }
        })
        .await;

        assert!(matches!(result, Err(PublishError::Redis(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);

        let result = deliver_with_retry(fast_policy(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(broker_down())
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let calls = AtomicU32::new(0);

        let result = deliver_with_retry(fast_policy(2), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(broker_down()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_attempt_timeout() {
        let result = deliver_with_retry(fast_policy(0), || async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(PublishError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_channel_publisher_forwards() {
        let (publisher, mut rx) = ChannelPublisher::new();

        publisher.publish(OrderEvent::order_created(1));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.message, "Order 1 created");
    }

    #[test]
    fn test_channel_publisher_survives_dropped_receiver() {
        let (publisher, rx) = ChannelPublisher::new();
        drop(rx);

        publisher.publish(OrderEvent::order_deleted(1));
    }

    #[tokio::test]
    async fn test_redis_connect_failure_is_reported() {
        // Nothing listens on port 1
        let result = RedisPublisher::connect(
            "redis://127.0.0.1:1/",
            "orders",
            fast_policy(0),
        )
        .await;

        assert!(result.is_err());
    }
}
