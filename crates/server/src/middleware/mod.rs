//! HTTP middleware and extractors.

pub mod auth;
pub mod request_id;

pub use auth::{CurrentUser, RequireAdmin};
pub use request_id::request_id_middleware;
