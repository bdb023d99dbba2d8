//! Address domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pomelo_core::{AddressId, UserId};

/// A shipping address owned by a user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    /// Unique address ID.
    pub id: AddressId,
    /// Owning user.
    pub user_id: UserId,
    /// State or province.
    pub state: String,
    /// City.
    pub city: String,
    /// Free-form street description.
    pub description: String,
    /// Postal code.
    pub postal_code: String,
    /// Optional latitude.
    pub latitude: Option<f64>,
    /// Optional longitude.
    pub longitude: Option<f64>,
    /// When the address was created.
    pub created_at: DateTime<Utc>,
    /// When the address was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or replacing an address.
///
/// The owning user is always the authenticated caller, never part of the
/// payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressPayload {
    pub state: String,
    pub city: String,
    pub description: String,
    pub postal_code: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}
