//! Database operations for the Pomelo `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `app_user` - Registered users and password hashes
//! - `auth_token` - Opaque access tokens with expiry
//! - `address` - User shipping addresses
//! - `product` - Catalog items with price and available stock
//! - `"order"` / `order_line` - Orders and their priced line items
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and are embedded via
//! `sqlx::migrate!`; the server runs them on startup.
//!
//! # Transactions
//!
//! Reads take the shared [`PgPool`]. Writes that must be atomic take a
//! `&mut PgTransaction` so the service layer can compose several repository
//! writes into a single all-or-nothing unit (see
//! [`crate::services::orders`]).

pub mod addresses;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;

pub use addresses::AddressRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// A `PostgreSQL` transaction handle, as taken by repository write methods.
pub type PgTx<'t> = Transaction<'t, Postgres>;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Concurrent writers collided; the transaction rolled back and may be
    /// retried from scratch.
    #[error("storage write conflict")]
    Serialization,

    /// The database could not be reached (pool exhausted, connection lost).
    #[error("storage unavailable: {0}")]
    Unavailable(sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique phone number).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for RepositoryError {
    /// Classify a raw sqlx error into the repository taxonomy.
    ///
    /// Serialization failures (SQLSTATE 40001) and deadlocks (40P01) become
    /// [`RepositoryError::Serialization`]; connectivity faults become
    /// [`RepositoryError::Unavailable`]; everything else stays a generic
    /// database error.
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("40001" | "40P01") => Self::Serialization,
                _ => Self::Database(e),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(e)
            }
            _ => Self::Database(e),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_classified_as_unavailable() {
        let err: RepositoryError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, RepositoryError::Unavailable(_)));
    }

    #[test]
    fn row_not_found_stays_generic() {
        let err: RepositoryError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
