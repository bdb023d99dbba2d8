//! Address repository for database operations.
//!
//! Every operation is scoped by the owning user id; a user can never read or
//! modify another user's addresses through this repository.

use sqlx::PgPool;

use pomelo_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::address::{Address, AddressPayload};

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new address for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        user_id: UserId,
        payload: &AddressPayload,
    ) -> Result<Address, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            "INSERT INTO address (user_id, state, city, description, postal_code, latitude, longitude)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(user_id)
        .bind(&payload.state)
        .bind(&payload.city)
        .bind(&payload.description)
        .bind(&payload.postal_code)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .fetch_one(self.pool)
        .await?;

        Ok(address)
    }

    /// Get one of the user's addresses by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            "SELECT * FROM address WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(address)
    }

    /// Replace one of the user's addresses.
    ///
    /// Returns `None` if the address does not exist or belongs to another
    /// user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_for_user(
        &self,
        id: AddressId,
        user_id: UserId,
        payload: &AddressPayload,
    ) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            "UPDATE address
             SET state = $3, city = $4, description = $5, postal_code = $6,
                 latitude = $7, longitude = $8, updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .bind(&payload.state)
        .bind(&payload.city)
        .bind(&payload.description)
        .bind(&payload.postal_code)
        .bind(payload.latitude)
        .bind(payload.longitude)
        .fetch_optional(self.pool)
        .await?;

        Ok(address)
    }

    /// Delete one of the user's addresses.
    ///
    /// # Returns
    ///
    /// `true` if the address was deleted, `false` if it did not exist or
    /// belongs to another user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if existing orders still ship to
    /// the address. Returns `RepositoryError::Database` for other failures.
    pub async fn delete_for_user(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM address WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "address is referenced by existing orders".to_owned(),
                    );
                }
                RepositoryError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the address exists and belongs to the user.
    ///
    /// The ownership predicate behind order placement. Advisory with respect
    /// to races: a concurrent address deletion does not invalidate an order
    /// that already passed this check.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_for_user(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM address WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }
}
