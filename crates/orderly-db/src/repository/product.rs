//! # Product Repository
//!
//! Database operations for the product catalogue.
//!
//! Products are referenced by order lines but never owned by them: deleting a
//! product that a line still names fails with `DbError::ForeignKeyViolation`.

use orderly_core::{NewProduct, Page, Product};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents";

/// Repository for product database operations.
///
/// ## Thread Safety
/// This struct is `Clone` and can be shared across async tasks.
/// The underlying `SqlitePool` handles connection management.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository with the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    pub async fn create(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(name = %product.name, price = %product.price, "Inserting product");

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let created: Product = sqlx::query_as(&format!(
            "INSERT INTO products (name, description, price_cents)
             VALUES (?1, ?2, ?3)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.cents())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await.map_err(DbError::transaction)?;
        Ok(created)
    }

    /// Gets a product by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products in insertion order.
    pub async fn list(&self, page: Page) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id LIMIT ?1 OFFSET ?2"
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Replaces a product's name, description and price.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The product after the update
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: i64, product: &NewProduct) -> DbResult<Product> {
        debug!(id, "Updating product");

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let updated: Option<Product> = sqlx::query_as(&format!(
            "UPDATE products SET name = ?2, description = ?3, price_cents = ?4
             WHERE id = ?1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.cents())
        .fetch_optional(&mut *tx)
        .await?;

        let updated = updated.ok_or_else(|| DbError::not_found("Product", id))?;

        tx.commit().await.map_err(DbError::transaction)?;
        Ok(updated)
    }

    /// Deletes a product.
    ///
    /// ## Returns
    /// * `Ok(())` - Product deleted
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::ForeignKeyViolation)` - An order line still references it
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        tx.commit().await.map_err(DbError::transaction)?;
        Ok(())
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
