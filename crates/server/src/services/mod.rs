//! Service layer.
//!
//! Thin orchestration between the route handlers and the repositories.
//! Services own the business rules; repositories own the SQL.

pub mod auth;
pub mod orders;

pub use auth::AuthService;
pub use orders::{OrderError, OrderService};
