//! # orderly-core: Pure Domain Logic for Orderly
//!
//! This crate holds the order-management domain as plain data and pure
//! functions. Nothing in here touches the database, the network or the
//! message broker.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Orderly Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 orderly-api (HTTP + auth + events)              │   │
//! │  │   POST /token ──► POST /orders/ ──► POST /orders/{id}/details/  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ orderly-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   event   │  │ validation│  │   │
//! │  │   │   Order   │  │   Money   │  │ OrderEvent│  │   rules   │  │   │
//! │  │   │  Product  │  │           │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  orderly-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, OrderDetail, Product, OrderStatus)
//! - [`money`] - Money type with integer arithmetic
//! - [`event`] - Order lifecycle event payloads
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use orderly_core::money::Money;
//!
//! // JSON numbers come in as floats and are converted once, at the edge
//! let total = Money::from_decimal(100.0).unwrap();
//! assert_eq!(total.cents(), 10_000);
//! assert_eq!(total.to_decimal(), 100.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod event;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use event::{OrderEvent, OrderEventKind};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used when a listing request does not name one.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Largest page a single listing request may ask for.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Largest quantity accepted on a single order line.
pub const MAX_LINE_QUANTITY: i64 = 9_999;
