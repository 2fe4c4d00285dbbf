//! # Domain Types
//!
//! Core domain types used throughout Orderly.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │  OrderDetail    │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  order_id (FK)  │   │  id             │       │
//! │  │  customer_name  │   │  product_id (FK)│──►│  name           │       │
//! │  │  total_cents    │   │  quantity       │   │  price_cents    │       │
//! │  │  status         │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  An Order owns its details (deleted together).                          │
//! │  A Product is only referenced; it outlives the lines that name it.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Ids are SQLite `INTEGER PRIMARY KEY AUTOINCREMENT` values: assigned by the
//! database on insert, never reused, never changed afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;
use crate::validation::{validate_page_limit, ValidationResult};
use crate::DEFAULT_PAGE_LIMIT;

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle state of an order.
///
/// Every order is created `pending`. No operation advances it today;
/// the terminal states exist so stored values outside `pending` still decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Accepted, awaiting fulfilment.
    Pending,
    /// Fulfilled.
    Completed,
    /// Abandoned before fulfilment.
    Cancelled,
}

impl OrderStatus {
    /// Wire/database spelling of the status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A customer order as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    /// Database-assigned identifier.
    pub id: i64,

    /// Name of the customer who placed the order.
    pub customer_name: String,

    /// Order total in cents.
    pub total_amount_cents: i64,

    /// Lifecycle state (always `pending` on creation).
    pub status: OrderStatus,
}

impl Order {
    /// Returns the total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

/// Fields a caller supplies to create or replace an order.
///
/// Carries no status: creation defaults it and replacement keeps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub total_amount: Money,
}

// =============================================================================
// Order Detail
// =============================================================================

/// One line of an order: a product and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderDetail {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

/// Fields for a new order line. The owning order comes from the URL path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderDetail {
    pub product_id: i64,
    pub quantity: i64,
}

// =============================================================================
// Product
// =============================================================================

/// A catalogue product that order lines can reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Database-assigned identifier.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Free-text description (empty when not given).
    pub description: String,

    /// Unit price in cents.
    pub price_cents: i64,
}

impl Product {
    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Fields a caller supplies to create or replace a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Money,
}

// =============================================================================
// Paging
// =============================================================================

/// Offset pagination window for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Rows to skip from the start of the id-ordered listing.
    pub skip: u32,
    /// Maximum rows to return.
    pub limit: u32,
}

impl Page {
    /// Builds a validated page. `limit` must lie in `1..=MAX_PAGE_LIMIT`.
    pub fn new(skip: u32, limit: u32) -> ValidationResult<Self> {
        validate_page_limit(limit)?;
        Ok(Page { skip, limit })
    }
}

impl Default for Page {
    fn default() -> Self {
        Page {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
