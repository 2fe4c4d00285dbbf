//! # Repository Module
//!
//! Database repository implementations for Orderly.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  OrderService                                                          │
//! │       │                                                                 │
//! │       │  db.orders().create(&new_order)                                │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── create(&self, order)      BEGIN … INSERT … RETURNING … COMMIT     │
//! │  ├── get(&self, id)                                                    │
//! │  ├── list(&self, page)                                                 │
//! │  ├── update(&self, id, order)  BEGIN … UPDATE … RETURNING … COMMIT     │
//! │  └── delete(&self, id)         BEGIN … DELETE lines, order … COMMIT    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Every write owns its transaction. Any early return drops the          │
//! │  transaction, which rolls it back; only the final commit persists.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`OrderRepository`](order::OrderRepository) - Order CRUD
//! - [`OrderDetailRepository`](order_detail::OrderDetailRepository) - Order lines
//! - [`ProductRepository`](product::ProductRepository) - Product catalogue

pub mod order;
pub mod order_detail;
pub mod product;
