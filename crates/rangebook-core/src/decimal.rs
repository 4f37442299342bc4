//! Precision-safe decimal types and base-unit conversion.
//!
//! Uses `rust_decimal` for exact base-10 arithmetic. Human-unit values are
//! only turned into integer base units at the token boundary, and every
//! such conversion names its rounding direction explicitly.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, EngineResult};

/// Number of fractional digits a token's base unit represents.
pub type TokenDecimals = u8;

/// Largest power of ten representable in a `Decimal` (and the max scale).
const MAX_TEN_EXPONENT: u32 = 28;

/// Rounding applied when a decimal is forced onto an integer grid.
///
/// No `Default`: every call site picks a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    /// Toward positive infinity. Use for minimum required amounts.
    Ceil,
    /// Toward negative infinity. Use for deliverable amounts.
    Floor,
    /// Toward zero.
    Truncate,
}

impl Rounding {
    #[inline]
    pub fn apply(self, value: Decimal) -> Decimal {
        match self {
            Rounding::Ceil => value.ceil(),
            Rounding::Floor => value.floor(),
            Rounding::Truncate => value.trunc(),
        }
    }
}

/// `10^exp` for a signed exponent.
///
/// Fails with `Overflow` when `|exp|` exceeds what a `Decimal` can hold.
pub fn ten_pow(exp: i32) -> EngineResult<Decimal> {
    let magnitude = exp.unsigned_abs();
    if magnitude > MAX_TEN_EXPONENT {
        return Err(EngineError::Overflow(format!("10^{exp} is not representable")));
    }
    if exp >= 0 {
        Decimal::try_from_i128_with_scale(10i128.pow(magnitude), 0)
            .map_err(|e| EngineError::Overflow(format!("10^{exp}: {e}")))
    } else {
        Ok(Decimal::new(1, magnitude))
    }
}

/// Scale a human amount into integer base units: `x * 10^decimals`.
pub fn to_base_units(
    value: Decimal,
    decimals: TokenDecimals,
    rounding: Rounding,
) -> EngineResult<Decimal> {
    let scale = ten_pow(i32::from(decimals))?;
    let scaled = value
        .checked_mul(scale)
        .ok_or_else(|| EngineError::Overflow(format!("{value} * 10^{decimals}")))?;
    Ok(rounding.apply(scaled).normalize())
}

/// Scale integer base units back into human units: `x / 10^decimals`.
pub fn from_base_units(value: Decimal, decimals: TokenDecimals) -> EngineResult<Decimal> {
    let scale = ten_pow(i32::from(decimals))?;
    value
        .checked_div(scale)
        .map(|v| v.normalize())
        .ok_or_else(|| EngineError::Overflow(format!("{value} / 10^{decimals}")))
}

/// Truncate to at most `decimals` fractional digits, never rounding up.
#[inline]
pub fn trim_decimal(value: Decimal, decimals: TokenDecimals) -> Decimal {
    value
        .round_dp_with_strategy(u32::from(decimals), RoundingStrategy::ToZero)
        .normalize()
}

/// Price in human units (quote per base).
///
/// Wraps `Decimal` to keep prices and budgets from being mixed up in
/// strategy parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Truncate to the quote token's precision for display.
    #[inline]
    pub fn trimmed(&self, decimals: TokenDecimals) -> Self {
        Self(trim_decimal(self.0, decimals))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

/// Budget in human units of the token it is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Budget(pub Decimal);

impl Budget {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Convert to base units, rounding down to a deliverable amount.
    pub fn to_base_units(&self, decimals: TokenDecimals) -> EngineResult<Decimal> {
        to_base_units(self.0, decimals, Rounding::Floor)
    }

    /// Build from a base-unit liquidity value.
    pub fn from_base_units(liquidity: Decimal, decimals: TokenDecimals) -> EngineResult<Self> {
        from_base_units(liquidity, decimals).map(Self)
    }

    #[inline]
    pub fn trimmed(&self, decimals: TokenDecimals) -> Self {
        Self(trim_decimal(self.0, decimals))
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Budget {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Budget {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ten_pow() {
        assert_eq!(ten_pow(0).unwrap(), dec!(1));
        assert_eq!(ten_pow(6).unwrap(), dec!(1000000));
        assert_eq!(ten_pow(-12).unwrap(), dec!(0.000000000001));
        assert_eq!(ten_pow(28).unwrap(), dec!(10000000000000000000000000000));
        assert!(matches!(ten_pow(29), Err(EngineError::Overflow(_))));
        assert!(matches!(ten_pow(-29), Err(EngineError::Overflow(_))));
    }

    #[test]
    fn test_to_base_units_rounding_directions() {
        let value = dec!(1.2345678);
        assert_eq!(to_base_units(value, 6, Rounding::Floor).unwrap(), dec!(1234567));
        assert_eq!(to_base_units(value, 6, Rounding::Ceil).unwrap(), dec!(1234568));
        assert_eq!(to_base_units(value, 6, Rounding::Truncate).unwrap(), dec!(1234567));

        // Floor and truncate only diverge below zero
        let negative = dec!(-1.2345678);
        assert_eq!(to_base_units(negative, 6, Rounding::Floor).unwrap(), dec!(-1234568));
        assert_eq!(to_base_units(negative, 6, Rounding::Truncate).unwrap(), dec!(-1234567));
    }

    #[test]
    fn test_to_base_units_eighteen_decimals() {
        let wei = to_base_units(dec!(0.5), 18, Rounding::Floor).unwrap();
        assert_eq!(wei.to_string(), "500000000000000000");
    }

    #[test]
    fn test_to_base_units_overflow() {
        let huge = dec!(100000000000000000000);
        assert!(matches!(
            to_base_units(huge, 18, Rounding::Floor),
            Err(EngineError::Overflow(_))
        ));
    }

    #[test]
    fn test_from_base_units_is_exact() {
        assert_eq!(from_base_units(dec!(1000000000), 6).unwrap(), dec!(1000));
        assert_eq!(
            from_base_units(dec!(123456789012345678), 18).unwrap(),
            dec!(0.123456789012345678)
        );
        assert_eq!(from_base_units(dec!(42), 0).unwrap(), dec!(42));
    }

    #[test]
    fn test_trim_decimal_never_rounds_up() {
        assert_eq!(trim_decimal(dec!(1999.9999999), 6), dec!(1999.999999));
        assert_eq!(trim_decimal(dec!(0.5025187), 4), dec!(0.5025));
        assert_eq!(trim_decimal(dec!(12.5), 6), dec!(12.5));
        assert_eq!(trim_decimal(dec!(-1.99), 1), dec!(-1.9));
    }

    #[test]
    fn test_price_and_budget_signs() {
        assert!(Price::new(dec!(-0.01)).is_negative());
        assert!(!Price::ZERO.is_negative());
        assert!(!Price::new(dec!(1800)).is_negative());
        assert!(Budget::new(dec!(-1)).is_negative());
        assert!(!Budget::ZERO.is_negative());
    }

    #[test]
    fn test_price_parse_and_display() {
        let price: Price = "2000.50".parse().unwrap();
        assert_eq!(price.inner(), dec!(2000.50));
        assert_eq!(price.trimmed(1).to_string(), "2000.5");
        assert!("abc".parse::<Price>().is_err());
    }

    #[test]
    fn test_budget_serializes_as_string() {
        let budget = Budget::new(dec!(0.5));
        let json = serde_json::to_string(&budget).unwrap();
        assert_eq!(json, "\"0.5\"");
    }

    proptest! {
        #[test]
        fn prop_budget_survives_base_unit_round_trip(
            mantissa in 0i64..10_000_000_000,
            scale in 0u32..12,
            decimals in 0u8..=18,
        ) {
            let budget = Decimal::new(mantissa, scale);
            let wei = to_base_units(budget, decimals, Rounding::Floor).unwrap();
            let back = from_base_units(wei, decimals).unwrap();
            let tolerance = ten_pow(-i32::from(decimals)).unwrap();
            prop_assert!(back <= budget);
            prop_assert!(budget - back < tolerance);
        }
    }
}
