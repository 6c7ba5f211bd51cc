//! Shared fragments used across entity schemas.

use barrel_core::{field, Store, StoreError};
use rust_decimal::Decimal;
use serde_json::Value;

/// The reaktor price fragment: an exact decimal amount plus an ISO
/// currency code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    pub amount: Decimal,
    pub currency: String,
}

impl Store for Price {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Price {
            amount: field(raw, "amount").decimal()?,
            currency: field(raw, "currency").string()?,
        })
    }
}

/// Sort direction for the paginated list calls. The backend takes an
/// "inverted" flag instead of a direction name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// The `invert` flag the backend expects.
    pub fn inverted(self) -> bool {
        self == Direction::Desc
    }
}
