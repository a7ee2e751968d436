//! Monetary amounts in minor units.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// A monetary amount stored in minor units (cents) so the exact-equality
/// comparisons in the payment rules are free of rounding artifacts.
///
/// All back-office amounts share the agency's settlement currency, so no
/// currency tag is carried.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a new Money value. Negative amounts are rejected.
    pub fn new(minor: i64) -> Result<Self, DomainError> {
        if minor < 0 {
            return Err(DomainError::NegativeAmount);
        }
        Ok(Self(minor))
    }

    /// A zero amount.
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in minor units.
    pub fn minor(&self) -> i64 {
        self.0
    }

    /// Returns true for a zero amount.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Reconstructs a Money value from a database column without the
    /// non-negativity check (stored values were validated on the way in).
    pub fn from_minor_unchecked(minor: i64) -> Self {
        Self(minor)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let major = self.0 / 100;
        let minor = (self.0 % 100).abs();
        write!(f, "{}.{:02}", major, minor)
    }
}
