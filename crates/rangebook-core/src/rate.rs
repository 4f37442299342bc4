//! Conversion between human prices and internal order rates.
//!
//! An order rate is a price expressed as a ratio of base units, so it
//! absorbs the difference between the two tokens' decimals. With 18 vs 6
//! decimal tokens that factor is `10^±12`, which would eat most of a
//! `Decimal`'s 28 digits. [`Rate`] therefore keeps the power of ten apart
//! from the mantissa and rescaling never rounds.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::decimal::{ten_pow, TokenDecimals};
use crate::error::{EngineError, EngineResult};

/// Internal order rate: `mantissa * 10^exponent`.
#[derive(Debug, Clone, Copy)]
pub struct Rate {
    mantissa: Decimal,
    exponent: i32,
}

impl Rate {
    pub const ZERO: Self = Self {
        mantissa: Decimal::ZERO,
        exponent: 0,
    };

    pub fn new(mantissa: Decimal, exponent: i32) -> Self {
        if mantissa.is_zero() {
            return Self::ZERO;
        }
        Self {
            mantissa: mantissa.normalize(),
            exponent,
        }
    }

    #[inline]
    pub fn mantissa(&self) -> Decimal {
        self.mantissa
    }

    #[inline]
    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.mantissa.is_sign_negative() && !self.mantissa.is_zero()
    }

    /// Multiply by `10^shift`. Exact.
    #[inline]
    pub fn shifted(self, shift: i32) -> Self {
        Self::new(self.mantissa, self.exponent + shift)
    }

    /// `1 / self`, with zero mapped to zero.
    pub fn reciprocal(self) -> EngineResult<Self> {
        if self.is_zero() {
            return Ok(Self::ZERO);
        }
        let inverted = Decimal::ONE
            .checked_div(self.mantissa)
            .ok_or_else(|| EngineError::Overflow(format!("1 / {}", self.mantissa)))?;
        Ok(Self::new(inverted, -self.exponent))
    }

    /// Collapse into a plain `Decimal`.
    ///
    /// Fails with `Overflow` when the value does not fit a `Decimal`.
    pub fn to_decimal(&self) -> EngineResult<Decimal> {
        if self.exponent == 0 || self.is_zero() {
            return Ok(self.mantissa);
        }
        let factor = ten_pow(self.exponent.abs())?;
        let value = if self.exponent > 0 {
            self.mantissa.checked_mul(factor)
        } else {
            self.mantissa.checked_div(factor)
        };
        value
            .map(|v| v.normalize())
            .ok_or_else(|| EngineError::Overflow(format!("rate {self} as decimal")))
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Self::new(d, 0)
    }
}

impl Rate {
    /// `-1`, `0` or `1`.
    fn sign(&self) -> i8 {
        if self.mantissa.is_zero() {
            0
        } else if self.mantissa.is_sign_negative() {
            -1
        } else {
            1
        }
    }

    /// `|value| = digits * 10^exponent` with `digits` an integer carrying no
    /// trailing zeros. Equal values share the same parts.
    fn integer_parts(&self) -> (i128, i64) {
        let mut digits = self.mantissa.mantissa().abs();
        let mut exponent = i64::from(self.exponent) - i64::from(self.mantissa.scale());
        while digits != 0 && digits % 10 == 0 {
            digits /= 10;
            exponent += 1;
        }
        (digits, exponent)
    }
}

fn digit_count(mut value: i128) -> i64 {
    let mut count = 1;
    while value >= 10 {
        value /= 10;
        count += 1;
    }
    count
}

fn cmp_magnitude(a: (i128, i64), b: (i128, i64)) -> Ordering {
    let (a_digits, a_exp) = a;
    let (b_digits, b_exp) = b;

    // Position of the leading digit decides unless both lead at the same place
    let by_leading = (digit_count(a_digits) + a_exp).cmp(&(digit_count(b_digits) + b_exp));
    if by_leading != Ordering::Equal {
        return by_leading;
    }

    // Same leading position: the exponents differ by at most 28, and the
    // widened side stays within the other's digit count
    if a_exp >= b_exp {
        let widened = a_digits * 10i128.pow((a_exp - b_exp) as u32);
        widened.cmp(&b_digits)
    } else {
        let widened = b_digits * 10i128.pow((b_exp - a_exp) as u32);
        a_digits.cmp(&widened)
    }
}

impl Ord for Rate {
    fn cmp(&self, other: &Self) -> Ordering {
        let sign_order = self.sign().cmp(&other.sign());
        if sign_order != Ordering::Equal || self.is_zero() {
            return sign_order;
        }
        let ordering = cmp_magnitude(self.integer_parts(), other.integer_parts());
        if self.is_negative() {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

impl PartialOrd for Rate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Rate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rate {}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponent == 0 {
            write!(f, "{}", self.mantissa)
        } else {
            write!(f, "{}e{}", self.mantissa, self.exponent)
        }
    }
}

impl FromStr for Rate {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.split_once(|c: char| c == 'e' || c == 'E') {
            Some((mantissa, exponent)) => {
                let exponent = exponent.parse::<i32>().map_err(|e| {
                    EngineError::InvalidPrice(format!("rate exponent {exponent}: {e}"))
                })?;
                Ok(Self::new(mantissa.parse()?, exponent))
            }
            None => Ok(Self::new(trimmed.parse()?, 0)),
        }
    }
}

impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// `amount * 10^(amount_decimals - other_decimals)`.
pub fn normalize_rate(
    amount: impl Into<Rate>,
    amount_decimals: TokenDecimals,
    other_decimals: TokenDecimals,
) -> Rate {
    amount
        .into()
        .shifted(i32::from(amount_decimals) - i32::from(other_decimals))
}

/// `normalize_rate(1 / amount, other_decimals, amount_decimals)`.
///
/// Zero maps to zero. Applying it twice with the same decimals returns the
/// input, which is how sell-side orders are decoded.
pub fn normalize_inverted_rate(
    amount: impl Into<Rate>,
    amount_decimals: TokenDecimals,
    other_decimals: TokenDecimals,
) -> EngineResult<Rate> {
    let inverted = amount.into().reciprocal()?;
    Ok(normalize_rate(inverted, other_decimals, amount_decimals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_rate_scales_by_decimal_difference() {
        // 1800 USDC (6) per ETH (18) in base units
        let rate = normalize_rate(dec!(1800), 6, 18);
        assert_eq!(rate.to_decimal().unwrap(), dec!(0.0000000018));
        assert_eq!(rate.to_string(), "1800e-12");

        let rate = normalize_rate(dec!(1800), 18, 6);
        assert_eq!(rate.to_decimal().unwrap(), dec!(1800000000000000));

        assert_eq!(normalize_rate(dec!(1800), 8, 8).to_string(), "1800");
    }

    #[test]
    fn test_normalize_inverted_rate() {
        let rate = normalize_inverted_rate(dec!(2000), 6, 18).unwrap();
        assert_eq!(rate.to_decimal().unwrap(), dec!(500000000));

        let rate = normalize_inverted_rate(dec!(4), 18, 18).unwrap();
        assert_eq!(rate.to_decimal().unwrap(), dec!(0.25));
    }

    #[test]
    fn test_normalize_inverted_rate_of_zero_is_zero() {
        assert!(normalize_inverted_rate(Decimal::ZERO, 6, 18).unwrap().is_zero());
        assert_eq!(
            normalize_inverted_rate(Decimal::ZERO, 18, 0).unwrap().to_decimal().unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_inverted_rate_is_self_inverse() {
        let rate = normalize_inverted_rate(dec!(2000), 6, 18).unwrap();
        let back = normalize_inverted_rate(rate, 6, 18).unwrap();
        assert_eq!(back.to_decimal().unwrap(), dec!(2000));
    }

    #[test]
    fn test_rate_ordering_across_exponents() {
        let a = Rate::new(dec!(5), 3);
        let b = Rate::new(dec!(5000), 0);
        let c = Rate::new(dec!(4999.9), 0);
        assert_eq!(a, b);
        assert!(c < a);
        assert!(Rate::new(dec!(1), 40) > Rate::new(dec!(79228162514264337593543950335), 0));
        assert!(Rate::new(dec!(-1), 40) < Rate::new(dec!(-1), 0));
        assert!(Rate::ZERO < Rate::new(dec!(1), -30));
        assert!(Rate::new(dec!(-1), -30) < Rate::ZERO);

        // Fractional mantissa offsets a wide exponent gap
        let wide = Rate::new(dec!(0.00000000000000000001), 30);
        let plain = Rate::new(dec!(10000000000), 0);
        assert_eq!(wide, plain);
        assert_eq!(wide.cmp(&plain), Ordering::Equal);
        assert!(Rate::new(dec!(0.00000000000000000002), 30) > plain);
        assert!(Rate::new(dec!(-0.00000000000000000001), 30) < Rate::new(dec!(-9999999999), 0));
        assert!(Rate::new(dec!(79228162514264337593543950335), 0) > Rate::new(dec!(7), 28));
        assert!(Rate::new(dec!(79228162514264337593543950335), 0) < Rate::new(dec!(8), 28));
    }

    #[test]
    fn test_rate_string_round_trip() {
        let rate: Rate = "4.5e-16".parse().unwrap();
        assert_eq!(rate.mantissa(), dec!(4.5));
        assert_eq!(rate.exponent(), -16);
        assert_eq!(rate.to_string().parse::<Rate>().unwrap(), rate);

        let plain: Rate = "0.25".parse().unwrap();
        assert_eq!(plain.exponent(), 0);
        assert!("1e".parse::<Rate>().is_err());
    }

    #[test]
    fn test_to_decimal_out_of_range() {
        let tiny = Rate::new(dec!(1), -40);
        assert!(matches!(tiny.to_decimal(), Err(EngineError::Overflow(_))));
    }

    proptest! {
        #[test]
        fn prop_rate_round_trip_is_exact(
            mantissa in 1i64..1_000_000_000,
            scale in 0u32..6,
            d0 in 0u8..=18,
            d1 in 0u8..=18,
        ) {
            let price = Decimal::new(mantissa, scale);
            let rate = normalize_rate(price, d0, d1);
            let back = normalize_rate(rate, d1, d0);
            prop_assert_eq!(back.to_decimal().unwrap(), price.normalize());
        }

        #[test]
        fn prop_inverted_rate_round_trip_within_precision(
            mantissa in 1i64..1_000_000_000,
            scale in 0u32..6,
            d0 in 0u8..=18,
            d1 in 0u8..=18,
        ) {
            let price = Decimal::new(mantissa, scale);
            let rate = normalize_inverted_rate(price, d0, d1).unwrap();
            let back = normalize_inverted_rate(rate, d0, d1).unwrap().to_decimal().unwrap();
            let tolerance = price * dec!(0.000000000000000001);
            prop_assert!((back - price).abs() <= tolerance);
        }
    }
}
