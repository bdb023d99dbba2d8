//! National identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Required length of a national id.
const NID_LENGTH: usize = 10;

/// Errors that can occur when parsing a [`NationalId`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum NationalIdError {
    /// The input is not exactly [`NID_LENGTH`] digits long.
    #[error("national id must be exactly {NID_LENGTH} digits")]
    WrongLength,
    /// The input contains non-digit characters.
    #[error("national id must contain only digits")]
    NotNumeric,
}

/// A 10-digit national identification number.
///
/// Used as the unique legal identifier for a registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct NationalId(String);

impl NationalId {
    /// Parse and validate a national id.
    ///
    /// # Errors
    ///
    /// Returns [`NationalIdError`] if the input is not exactly 10 digits.
    pub fn parse(input: &str) -> Result<Self, NationalIdError> {
        let trimmed = input.trim();
        if trimmed.len() != NID_LENGTH {
            return Err(NationalIdError::WrongLength);
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NationalIdError::NotNumeric);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Get the national id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
