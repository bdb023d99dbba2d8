//! User repository for database operations.
//!
//! Provides database access for users and their access tokens. Queries use
//! the runtime sqlx API with explicit row mapping into domain types.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use pomelo_core::{Email, NationalId, UserId};

use super::RepositoryError;
use crate::models::user::User;

const USER_COLUMNS: &str =
    "id, nid, first_name, last_name, phone, email, scopes, created_at, updated_at";

/// Insert payload for a new user.
pub struct NewUser<'a> {
    pub nid: &'a NationalId,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: &'a str,
    pub email: Option<&'a Email>,
    pub password_hash: &'a str,
}

/// Repository for user and token database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the nid or phone is already
    /// registered. Returns `RepositoryError::Database` for other failures.
    pub async fn create(&self, new_user: &NewUser<'_>) -> Result<User, RepositoryError> {
        let row = sqlx::query(&format!(
            "INSERT INTO app_user (nid, first_name, last_name, phone, email, password_hash)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new_user.nid.as_str())
        .bind(new_user.first_name)
        .bind(new_user.last_name)
        .bind(new_user.phone)
        .bind(new_user.email.map(Email::as_str))
        .bind(new_user.password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("nid or phone already registered".to_owned());
            }
            RepositoryError::from(e)
        })?;

        map_user_row(&row)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored fields are invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(map_user_row).transpose()
    }

    /// Get a user and their password hash by phone number.
    ///
    /// Returns `None` if no user is registered under the phone number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored fields are invalid.
    pub async fn get_auth_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM app_user WHERE phone = $1"
        ))
        .bind(phone)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let password_hash: String = row.try_get("password_hash")?;
        Ok(Some((map_user_row(&row)?, password_hash)))
    }

    /// Store a newly issued access token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_token(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO auth_token (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Resolve an access token to its user.
    ///
    /// Expired tokens resolve to `None`; expiry is checked in the database so
    /// clock handling stays in one place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored fields are invalid.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            "SELECT u.id, u.nid, u.first_name, u.last_name, u.phone, u.email, u.scopes,
                    u.created_at, u.updated_at
             FROM auth_token t
             JOIN app_user u ON u.id = t.user_id
             WHERE t.token = $1 AND t.expires_at > now()",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(map_user_row).transpose()
    }
}

/// Map an `app_user` row into the domain type.
fn map_user_row(row: &PgRow) -> Result<User, RepositoryError> {
    let nid: String = row.try_get("nid")?;
    let nid = NationalId::parse(&nid)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid nid in database: {e}")))?;

    let email: Option<String> = row.try_get("email")?;
    let email = email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))?;

    Ok(User {
        id: row.try_get("id")?,
        nid,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        phone: row.try_get("phone")?,
        email,
        scopes: row.try_get("scopes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
