//! Product repository for database operations.
//!
//! Catalog reads/writes plus the two operations the stock reservation
//! transaction composes inside one database transaction:
//! [`ProductRepository::fetch_for_update`] and
//! [`ProductRepository::decrement_quantity`].

use std::collections::HashMap;

use sqlx::PgPool;

use pomelo_core::ProductId;

use super::{PgTx, RepositoryError};
use crate::models::product::{Product, ProductPayload};

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, payload: &ProductPayload) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO product (category, info, price, quantity)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(&payload.category)
        .bind(&payload.info)
        .bind(payload.price)
        .bind(payload.quantity)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM product WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(product)
    }

    /// Batch-fetch products by id in one round trip.
    ///
    /// Missing ids are simply absent from the returned map; callers detect
    /// them by lookup. No ordering guarantee.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, Product>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let products = sqlx::query_as::<_, Product>("SELECT * FROM product WHERE id = ANY($1)")
            .bind(&raw_ids)
            .fetch_all(self.pool)
            .await?;

        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }

    /// List products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM product ORDER BY id DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Replace a product's catalog fields.
    ///
    /// Returns `None` if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        payload: &ProductPayload,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "UPDATE product
             SET category = $2, info = $3, price = $4, quantity = $5, updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&payload.category)
        .bind(&payload.info)
        .bind(payload.price)
        .bind(payload.quantity)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Returns
    ///
    /// `true` if the product was deleted, `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if existing order lines still
    /// reference the product. Returns `RepositoryError::Database` for other
    /// failures.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "product is referenced by existing orders".to_owned(),
                    );
                }
                RepositoryError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Batch-fetch products inside a transaction, taking row locks.
    ///
    /// `ORDER BY id` fixes the lock acquisition order so two concurrent
    /// reservations touching the same products cannot deadlock. The locks
    /// are held until the surrounding transaction commits or rolls back.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Serialization` if the lock acquisition
    /// collides with a concurrent writer, `RepositoryError::Database` for
    /// other failures.
    pub async fn fetch_for_update(
        tx: &mut PgTx<'_>,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM product WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&raw_ids)
        .fetch_all(&mut **tx)
        .await?;

        Ok(products)
    }

    /// Conditionally decrement a product's stock inside a transaction.
    ///
    /// The `quantity >= $2` guard makes the decrement a compare-based
    /// update: it can never drive stock negative even if the caller's
    /// earlier read was stale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Serialization` if the guard no longer holds
    /// (another writer consumed the stock first); the caller should roll
    /// back and re-read. Returns `RepositoryError::Database` for other
    /// failures.
    pub async fn decrement_quantity(
        tx: &mut PgTx<'_>,
        id: ProductId,
        by: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE product
             SET quantity = quantity - $2, updated_at = now()
             WHERE id = $1 AND quantity >= $2",
        )
        .bind(id)
        .bind(by)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Serialization);
        }

        Ok(())
    }
}
