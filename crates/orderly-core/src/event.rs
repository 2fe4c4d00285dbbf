//! # Order Events
//!
//! Payloads emitted after an order mutation has been committed.
//!
//! ```text
//! ┌──────────────┐   commit ok   ┌──────────────┐   detached   ┌──────────┐
//! │ OrderService │ ────────────► │  OrderEvent  │ ───────────► │  broker  │
//! └──────────────┘               └──────────────┘              └──────────┘
//! ```
//!
//! The JSON form is what subscribers receive:
//! ```json
//! {
//!   "event_id": "6f1c...",
//!   "kind": "order_created",
//!   "entity_id": 3,
//!   "order_id": 3,
//!   "occurred_at": "2026-01-01T12:00:00Z",
//!   "message": "Order 3 created"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEventKind {
    OrderCreated,
    OrderUpdated,
    OrderDeleted,
    OrderDetailCreated,
}

impl fmt::Display for OrderEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderEventKind::OrderCreated => "order_created",
            OrderEventKind::OrderUpdated => "order_updated",
            OrderEventKind::OrderDeleted => "order_deleted",
            OrderEventKind::OrderDetailCreated => "order_detail_created",
        };
        f.write_str(name)
    }
}

/// A committed order lifecycle change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Unique per event; lets subscribers drop duplicates from retries.
    pub event_id: Uuid,
    pub kind: OrderEventKind,
    /// Id of the row that changed (the order, or the order line).
    pub entity_id: i64,
    /// Owning order.
    pub order_id: i64,
    pub occurred_at: DateTime<Utc>,
    /// Human-readable summary, e.g. `Order 3 created`.
    pub message: String,
}

impl OrderEvent {
    fn new(kind: OrderEventKind, entity_id: i64, order_id: i64, message: String) -> Self {
        OrderEvent {
            event_id: Uuid::new_v4(),
            kind,
            entity_id,
            order_id,
            occurred_at: Utc::now(),
            message,
        }
    }

    pub fn order_created(order_id: i64) -> Self {
        Self::new(
            OrderEventKind::OrderCreated,
            order_id,
            order_id,
            format!("Order {order_id} created"),
        )
    }

    pub fn order_updated(order_id: i64) -> Self {
        Self::new(
            OrderEventKind::OrderUpdated,
            order_id,
            order_id,
            format!("Order {order_id} updated"),
        )
    }

    pub fn order_deleted(order_id: i64) -> Self {
        Self::new(
            OrderEventKind::OrderDeleted,
            order_id,
            order_id,
            format!("Order {order_id} deleted"),
        )
    }

    pub fn order_detail_created(detail_id: i64, order_id: i64) -> Self {
        Self::new(
            OrderEventKind::OrderDetailCreated,
            detail_id,
            order_id,
            format!("Order detail {detail_id} created for order {order_id}"),
        )
    }

    /// Serializes the event for the wire.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
