//! Integer money amounts.
//!
//! Prices are stored in the smallest currency unit the shop uses. For rupiah
//! that is the rupiah itself, so a printer listed at 2,250,000 is stored as
//! `Cents(2_250_000)`. No floating point is ever involved.

use core::fmt;
use core::iter::Sum;

use serde::{Deserialize, Serialize};

/// A non-negative amount in minor currency units.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
#[serde(try_from = "i64", into = "i64")]
pub struct Cents(i64);

impl Cents {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw amount, rejecting negative values.
    #[must_use]
    pub const fn new(amount: i64) -> Option<Self> {
        if amount < 0 { None } else { Some(Self(amount)) }
    }

    /// The raw amount.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Multiply by a line quantity, returning `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(quantity)).map(Self)
    }

    /// Add two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Cents {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("amount cannot be negative (got {value})"))
    }
}

impl From<Cents> for i64 {
    fn from(value: Cents) -> Self {
        value.0
    }
}

impl Sum for Cents {
    /// Saturates instead of wrapping; callers that need overflow detection use
    /// [`Cents::checked_add`].
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.fold(0_i64, |acc, c| acc.saturating_add(c.0)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative() {
        assert!(Cents::new(-1).is_none());
        assert_eq!(Cents::new(0), Some(Cents::ZERO));
    }

    #[test]
    fn test_checked_mul() {
        let price = Cents::new(2_250_000).unwrap();
        assert_eq!(price.checked_mul(2), Cents::new(4_500_000));
        assert!(Cents::new(i64::MAX).unwrap().checked_mul(2).is_none());
    }

    #[test]
    fn test_sum() {
        let total: Cents = [100, 200, 300]
            .into_iter()
            .map(|v| Cents::new(v).unwrap())
            .sum();
        assert_eq!(total.as_i64(), 600);
    }
}
