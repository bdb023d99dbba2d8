//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid national id format.
    #[error("invalid national id: {0}")]
    InvalidNid(#[from] pomelo_core::NationalIdError),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] pomelo_core::EmailError),

    /// Invalid phone number.
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    /// The two password fields of a signup request differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Invalid credentials (wrong password or unknown phone).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A user with the same nid or phone already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
