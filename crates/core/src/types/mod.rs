//! Core types for Pomelo.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod nid;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use nid::{NationalId, NationalIdError};
pub use status::{OrderStatus, ParseOrderStatusError};
