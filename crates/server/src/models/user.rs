//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pomelo_core::{Email, NationalId, UserId};

/// A registered user (domain type).
///
/// The password hash never leaves [`crate::db::users`]; this type is safe to
/// serialize in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// National identification number.
    pub nid: NationalId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Phone number, the login identifier.
    pub phone: String,
    /// Optional email address.
    pub email: Option<Email>,
    /// Space-separated permission scopes (e.g. `"user admin"`).
    #[serde(skip_serializing)]
    pub scopes: String,
    /// When the user signed up.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the user carries the given permission scope.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.split_whitespace().any(|s| s == scope)
    }
}

/// Request body for `POST /auth/signup`.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub nid: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
    pub re_password: String,
}
