//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pomelo_core::{AddressId, OrderId, OrderLineId, OrderStatus, ProductId};

/// A placed order with its line items.
///
/// An order exclusively owns its lines; they are created together in one
/// transaction and deleted together. The address is a non-owning reference
/// that was verified to belong to the placing user at creation time only.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Shipping address reference.
    pub address_id: AddressId,
    /// Current lifecycle status; always `created` at placement.
    pub status: OrderStatus,
    /// When the status last changed.
    pub status_date: DateTime<Utc>,
    /// Line items, one per distinct product.
    pub lines: Vec<OrderLine>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// When the order was last updated.
    pub updated_at: DateTime<Utc>,
}

/// One product + quantity + price entry within an order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    /// Unique line ID.
    pub id: OrderLineId,
    /// Referenced product (not owned by the order).
    pub product_id: ProductId,
    /// Ordered quantity; always positive.
    pub quantity: i32,
    /// Unit price snapshotted from the product at order time. Later product
    /// price changes do not affect this value.
    pub price: i64,
    /// Descriptive product fields for display.
    pub product: ProductSummary,
}

/// The display subset of a product embedded in an order line.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub category: String,
    pub info: serde_json::Value,
}

/// Request body for `POST /order`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    /// Shipping address; must belong to the caller.
    pub address_id: AddressId,
    /// Requested products. Duplicate product ids are allowed and their
    /// quantities are summed before stock validation.
    pub lines: Vec<LineRequest>,
}

/// One requested product + quantity.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LineRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}
