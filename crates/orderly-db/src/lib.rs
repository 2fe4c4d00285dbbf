//! # orderly-db: Database Layer for Orderly
//!
//! This crate provides database access for the Orderly API.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Orderly Data Flow                                │
//! │                                                                         │
//! │  OrderService::create_order                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    orderly-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ OrderRepo      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderDetailRepo│    │ 001_init.sql │  │   │
//! │  │   │               │    │ ProductRepo    │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (./order.db, or in-memory for tests)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (order, order detail, product)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use orderly_db::{Database, DbConfig};
//! use orderly_core::{Money, NewOrder, Page};
//!
//! let db = Database::new(DbConfig::new("sqlite://./order.db")).await?;
//!
//! let order = db
//!     .orders()
//!     .create(&NewOrder {
//!         customer_name: "Test Customer".into(),
//!         total_amount: Money::from_cents(10_000),
//!     })
//!     .await?;
//!
//! let first_page = db.orders().list(Page::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::order::OrderRepository;
pub use repository::order_detail::OrderDetailRepository;
pub use repository::product::ProductRepository;
