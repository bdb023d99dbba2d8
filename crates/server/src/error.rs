//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; the response body is always `{"detail": "..."}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order placement failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks a required scope.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is a server fault worth reporting, as opposed to
    /// a client mistake.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Database(repo) => repository_is_server_error(repo),
            Self::Auth(AuthError::PasswordHash) => true,
            Self::Auth(AuthError::Repository(repo)) | Self::Order(OrderError::Repository(repo)) => {
                repository_is_server_error(repo)
            }
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(repo) => repository_status(repo),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidNid(_)
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidPhone(_)
                | AuthError::PasswordMismatch
                | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
                AuthError::Repository(repo) => repository_status(repo),
            },
            Self::Order(err) => match err {
                OrderError::InvalidAddress | OrderError::Validation(_) => StatusCode::BAD_REQUEST,
                OrderError::ProductNotFound(_) => StatusCode::NOT_FOUND,
                OrderError::InsufficientStock { .. } | OrderError::Conflict => StatusCode::CONFLICT,
                OrderError::Repository(repo) => repository_status(repo),
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Server faults are not described in detail.
    fn detail(&self) -> String {
        match self {
            Self::Database(repo) => repository_detail(repo),
            Self::Auth(AuthError::Repository(repo)) | Self::Order(OrderError::Repository(repo)) => {
                repository_detail(repo)
            }
            Self::Auth(AuthError::PasswordHash) | Self::Internal(_) => {
                "internal server error".to_owned()
            }
            Self::Auth(err) => err.to_string(),
            Self::Order(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(msg) | Self::Forbidden(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

const fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::Conflict(_) | RepositoryError::Serialization => StatusCode::CONFLICT,
        RepositoryError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn repository_detail(err: &RepositoryError) -> String {
    match err {
        RepositoryError::Conflict(msg) => msg.clone(),
        RepositoryError::Serialization => "write conflict, please retry".to_owned(),
        RepositoryError::Unavailable(_) => "storage temporarily unavailable".to_owned(),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            "internal server error".to_owned()
        }
    }
}

const fn repository_is_server_error(err: &RepositoryError) -> bool {
    matches!(
        err,
        RepositoryError::Database(_)
            | RepositoryError::DataCorruption(_)
            | RepositoryError::Unavailable(_)
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = Json(serde_json::json!({ "detail": self.detail() }));
        (self.status(), body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use pomelo_core::ProductId;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product".to_string());
        assert_eq!(err.to_string(), "Not found: product");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("test".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("test".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("test".to_string()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Internal("test".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn order_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::Order(OrderError::InvalidAddress).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Order(OrderError::ProductNotFound(ProductId::new(1))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Order(OrderError::InsufficientStock {
                product_id: ProductId::new(1),
                requested: 11,
                available: 10,
            })
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Order(OrderError::Conflict).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn unavailable_storage_maps_to_503() {
        let err = AppError::Database(RepositoryError::Unavailable(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.is_server_error());
    }

    #[test]
    fn client_errors_are_not_reported() {
        assert!(!AppError::Order(OrderError::InvalidAddress).is_server_error());
        assert!(!AppError::Auth(AuthError::InvalidCredentials).is_server_error());
        assert!(AppError::Internal("boom".to_string()).is_server_error());
    }
}
