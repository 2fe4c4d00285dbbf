//! # Order Repository
//!
//! Database operations for orders.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order Lifecycle                                  │
//! │                                                                         │
//! │  create ──► [pending] ──► update (name, total; status unchanged)       │
//! │                 │                                                       │
//! │                 └──► delete ──► order + all of its lines removed       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use orderly_core::{NewOrder, Order, OrderStatus, Page};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const ORDER_COLUMNS: &str = "id, customer_name, total_amount_cents, status";

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository with the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts a new order with status `pending`.
    ///
    /// ## Returns
    /// The stored order, including its database-assigned id.
    pub async fn create(&self, order: &NewOrder) -> DbResult<Order> {
        debug!(customer_name = %order.customer_name, "Inserting order");

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let created: Order = sqlx::query_as(&format!(
            "INSERT INTO orders (customer_name, total_amount_cents, status)
             VALUES (?1, ?2, ?3)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&order.customer_name)
        .bind(order.total_amount.cents())
        .bind(OrderStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(id = created.id, "Order inserted");
        Ok(created)
    }

    /// Gets an order by id.
    ///
    /// ## Returns
    /// * `Ok(Some(Order))` - Order found
    /// * `Ok(None)` - No such order
    pub async fn get(&self, id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Lists orders in insertion order.
    pub async fn list(&self, page: Page) -> DbResult<Vec<Order>> {
        debug!(skip = page.skip, limit = page.limit, "Listing orders");

        let orders = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id LIMIT ?1 OFFSET ?2"
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Replaces an order's customer name and total. Status is kept.
    ///
    /// ## Returns
    /// * `Ok(Order)` - The order after the update
    /// * `Err(DbError::NotFound)` - Order doesn't exist
    pub async fn update(&self, id: i64, order: &NewOrder) -> DbResult<Order> {
        debug!(id, "Updating order");

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let updated: Option<Order> = sqlx::query_as(&format!(
            "UPDATE orders SET customer_name = ?2, total_amount_cents = ?3
             WHERE id = ?1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(&order.customer_name)
        .bind(order.total_amount.cents())
        .fetch_optional(&mut *tx)
        .await?;

        let updated = updated.ok_or_else(|| DbError::not_found("Order", id))?;

        tx.commit().await.map_err(DbError::transaction)?;
        Ok(updated)
    }

    /// Deletes an order together with all of its lines.
    ///
    /// ## Returns
    /// * `Ok(n)` - Order deleted, along with `n` order lines
    /// * `Err(DbError::NotFound)` - Order doesn't exist (nothing is removed)
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        debug!(id, "Deleting order");

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let lines = sqlx::query("DELETE FROM order_details WHERE order_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(id, lines, "Order deleted");
        Ok(lines)
    }

    /// Checks whether an order exists.
    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
