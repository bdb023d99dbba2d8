//! Domain models and API payload types.
//!
//! Database row mapping lives in [`crate::db`]; these types are what the
//! services and route handlers pass around and serialize.

pub mod address;
pub mod order;
pub mod product;
pub mod user;

pub use address::{Address, AddressPayload};
pub use order::{LineRequest, Order, OrderLine, PlaceOrderRequest, ProductSummary};
pub use product::{Product, ProductPayload};
pub use user::{SignupRequest, User};
