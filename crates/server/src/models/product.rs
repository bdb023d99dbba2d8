//! Product domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pomelo_core::ProductId;

/// A catalog product.
///
/// `price` is in the minor currency unit (e.g. cents); `quantity` is the
/// stock available for new orders and is only ever decremented by the order
/// placement transaction.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Catalog category.
    pub category: String,
    /// Open-ended structured metadata (name, description, attributes...).
    pub info: serde_json::Value,
    /// Price in the minor currency unit.
    pub price: i64,
    /// Units available for new orders. Never negative.
    pub quantity: i32,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or replacing a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPayload {
    pub category: String,
    #[serde(default)]
    pub info: serde_json::Value,
    pub price: i64,
    pub quantity: i32,
}
