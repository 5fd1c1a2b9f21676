//! Deposit amounts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of attached value, in indivisible base units.
///
/// The registry only compares, adds and refunds amounts; what the units
/// denominate (and how they move) belongs to the external value ledger.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(u128);

impl Amount {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Create an amount from raw base units
    #[must_use]
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Get the raw base units
    #[must_use]
    pub const fn raw(&self) -> u128 {
        self.0
    }

    /// Saturating addition
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Saturating subtraction
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Checked subtraction; `None` on underflow
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Multiply by a scalar (saturating)
    #[must_use]
    pub const fn saturating_mul(self, factor: u128) -> Self {
        Self(self.0.saturating_mul(factor))
    }

    /// Whether the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
