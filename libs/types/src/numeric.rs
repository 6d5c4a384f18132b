//! Integer asset amounts
//!
//! Amounts are counted in the asset's smallest unit and never go negative.
//! All arithmetic is checked; division truncates toward zero, matching how
//! settlement assets round.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantity of an asset (or of pool shares) in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);
    pub const MAX: Amount = Amount(u128::MAX);

    pub const fn new(units: u128) -> Self {
        Self(units)
    }

    /// Raw base-unit value
    pub const fn units(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    pub fn saturating_sub(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_sub(rhs.0))
    }

    /// `self * numerator / denominator`, truncated.
    ///
    /// Returns `None` on multiplication overflow or a zero denominator.
    pub fn mul_div(self, numerator: Amount, denominator: Amount) -> Option<Amount> {
        if denominator.is_zero() {
            return None;
        }
        self.0
            .checked_mul(numerator.0)
            .map(|product| Amount(product / denominator.0))
    }

    /// `percent * self / 100`, truncated. `percent` above 100 is allowed
    /// arithmetically; callers validate ranges.
    pub fn percent(self, percent: u8) -> Option<Amount> {
        self.0
            .checked_mul(u128::from(percent))
            .map(|scaled| Amount(scaled / 100))
    }

    /// Render in whole-asset units given the asset's decimal places,
    /// e.g. `1_500_000` with 6 decimals is `1.500000`.
    ///
    /// Returns `None` when the value does not fit a `Decimal` mantissa.
    pub fn to_decimal(self, decimals: u32) -> Option<Decimal> {
        let units = i128::try_from(self.0).ok()?;
        Decimal::try_from_i128_with_scale(units, decimals).ok()
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self(u128::from(units))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mul_div_truncates() {
        let principal = Amount::new(1000);
        let result = principal.mul_div(Amount::new(2300), Amount::new(2000));
        assert_eq!(result, Some(Amount::new(1150)));

        let odd = Amount::new(1).mul_div(Amount::new(2), Amount::new(3));
        assert_eq!(odd, Some(Amount::ZERO));
    }

    #[test]
    fn test_mul_div_zero_denominator() {
        assert_eq!(Amount::new(5).mul_div(Amount::new(5), Amount::ZERO), None);
    }

    #[test]
    fn test_mul_div_overflow() {
        assert_eq!(Amount::MAX.mul_div(Amount::new(2), Amount::new(2)), None);
    }

    #[test]
    fn test_percent_truncates() {
        // 5% of 150 is 7.5
        assert_eq!(Amount::new(150).percent(5), Some(Amount::new(7)));
        assert_eq!(Amount::new(99).percent(0), Some(Amount::ZERO));
    }

    #[test]
    fn test_checked_sub_underflow() {
        assert_eq!(Amount::new(1).checked_sub(Amount::new(2)), None);
        assert_eq!(Amount::new(1).saturating_sub(Amount::new(2)), Amount::ZERO);
    }

    #[test]
    fn test_to_decimal() {
        let amount = Amount::new(1_500_000);
        assert_eq!(amount.to_decimal(6), Some(Decimal::new(1_500_000, 6)));
        assert_eq!(amount.to_decimal(6).unwrap().to_string(), "1.500000");
        assert_eq!(Amount::MAX.to_decimal(0), None);
    }

    #[test]
    fn test_serialization_is_transparent() {
        let json = serde_json::to_string(&Amount::new(42)).unwrap();
        assert_eq!(json, "42");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Amount::new(42));
    }

    proptest! {
        #[test]
        fn prop_percent_never_exceeds_whole(units in 0u128..=(u64::MAX as u128), pct in 0u8..=100) {
            let fee = Amount::new(units).percent(pct).unwrap();
            prop_assert!(fee <= Amount::new(units));
        }

        #[test]
        fn prop_share_of_pool_bounded(part in 1u64..=u64::MAX, extra in 0u64..=u64::MAX, balance in 0u64..=u64::MAX) {
            let supply = Amount::from(part).checked_add(Amount::from(extra)).unwrap();
            let claim = Amount::from(part).mul_div(Amount::from(balance), supply).unwrap();
            prop_assert!(claim <= Amount::from(balance));
        }
    }
}
