//! # Order Detail Repository
//!
//! Order lines. The foreign keys decide whether a line may be stored: the
//! insert is the first statement of its transaction, and a rejected insert is
//! explained afterwards by looking up the order.

use orderly_core::{NewOrderDetail, OrderDetail};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const DETAIL_COLUMNS: &str = "id, order_id, product_id, quantity";

/// Repository for order line database operations.
#[derive(Debug, Clone)]
pub struct OrderDetailRepository {
    pool: SqlitePool,
}

impl OrderDetailRepository {
    /// Creates a new OrderDetailRepository with the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        OrderDetailRepository { pool }
    }

    /// Adds a line to an existing order.
    ///
    /// ## Returns
    /// * `Ok(OrderDetail)` - The stored line
    /// * `Err(DbError::NotFound)` - The order or the product doesn't exist
    pub async fn create(&self, order_id: i64, detail: &NewOrderDetail) -> DbResult<OrderDetail> {
        debug!(
            order_id,
            product_id = detail.product_id,
            quantity = detail.quantity,
            "Adding order line"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let inserted: DbResult<OrderDetail> = sqlx::query_as(&format!(
            "INSERT INTO order_details (order_id, product_id, quantity)
             VALUES (?1, ?2, ?3)
             RETURNING {DETAIL_COLUMNS}"
        ))
        .bind(order_id)
        .bind(detail.product_id)
        .bind(detail.quantity)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from);

        match inserted {
            Ok(created) => {
                tx.commit().await.map_err(DbError::transaction)?;
                Ok(created)
            }
            Err(DbError::ForeignKeyViolation { .. }) => {
                tx.rollback().await.map_err(DbError::transaction)?;
                self.missing_parent(order_id, detail.product_id).await
            }
            Err(e) => Err(e),
        }
    }

    /// Names the parent row a rejected insert was missing.
    async fn missing_parent<T>(&self, order_id: i64, product_id: i64) -> DbResult<T> {
        let order_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE id = ?1)")
            .bind(order_id)
            .fetch_one(&self.pool)
            .await?;

        if order_exists {
            Err(DbError::not_found("Product", product_id))
        } else {
            Err(DbError::not_found("Order", order_id))
        }
    }

    /// Lists an order's lines in insertion order.
    ///
    /// Returns an empty list for an unknown order; callers that need to tell
    /// the two apart check the order first.
    pub async fn list_for_order(&self, order_id: i64) -> DbResult<Vec<OrderDetail>> {
        let details = sqlx::query_as(&format!(
            "SELECT {DETAIL_COLUMNS} FROM order_details WHERE order_id = ?1 ORDER BY id"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(details)
    }

    /// Counts the lines that reference a product.
    pub async fn count_for_product(&self, product_id: i64) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM order_details WHERE product_id = ?1")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
