//! Order placement error types.

use thiserror::Error;

use pomelo_core::ProductId;

use crate::db::RepositoryError;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The shipping address does not exist or belongs to another user.
    #[error("address does not belong to the caller")]
    InvalidAddress,

    /// The line list is empty or a quantity is not positive.
    #[error("invalid order: {0}")]
    Validation(String),

    /// A requested product does not exist. The whole order is rejected; no
    /// partial order is created.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Requested quantity exceeds available stock for a product.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i32,
        available: i32,
    },

    /// Concurrent reservations kept colliding on the same product rows and
    /// the bounded retries ran out. The caller may resubmit.
    #[error("order could not be committed due to concurrent updates")]
    Conflict,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
