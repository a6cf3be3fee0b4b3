//! Monetary amounts.

use core::ops::{Add, AddAssign};
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A monetary amount in the account's currency.
///
/// Backed by a decimal so that `0.1 + 0.2` stays exact. On the wire it is a
/// plain JSON number, which is what the dashboard sends and expects.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl core::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Amount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .map(Self)
            .map_err(|e| DomainError::validation(format!("amount: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_addition_is_exact() {
        let a: Amount = "0.1".parse().unwrap();
        let b: Amount = "0.2".parse().unwrap();
        assert_eq!(a + b, "0.3".parse().unwrap());
    }

    #[test]
    fn json_numbers_round_trip() {
        let a: Amount = serde_json::from_str("1500").unwrap();
        assert_eq!(a, Amount::from(1500));

        let b: Amount = serde_json::from_str("12.5").unwrap();
        assert_eq!(b, "12.5".parse().unwrap());

        let v = serde_json::to_value(b).unwrap();
        assert_eq!(v.as_f64(), Some(12.5));
    }

    #[test]
    fn sign_checks() {
        assert!(Amount::from(1).is_positive());
        assert!(!Amount::ZERO.is_positive());
        assert!(Amount::from(-3).is_negative());
        assert_eq!([Amount::from(2), Amount::from(3)].into_iter().sum::<Amount>(), Amount::from(5));
    }
}
