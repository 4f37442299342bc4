//! Trading fee calculation.
//!
//! Fees are expressed in parts-per-million of the traded amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rangebook_core::{EngineError, EngineResult, Rounding};

/// 1,000,000 ppm = 100%.
pub const PPM_RESOLUTION: u32 = 1_000_000;

/// Default trading fee: 2000 ppm (0.2%).
pub const DEFAULT_TRADING_FEE_PPM: u32 = 2_000;

fn ppm_complement(fee_ppm: u32) -> EngineResult<Decimal> {
    if fee_ppm >= PPM_RESOLUTION {
        return Err(EngineError::InvalidFee(fee_ppm));
    }
    Ok(Decimal::from(PPM_RESOLUTION - fee_ppm))
}

/// Minimum gross amount that nets `amount` after the fee.
///
/// `ceil(amount * PPM / (PPM - fee_ppm))`
pub fn add_fee(amount: Decimal, fee_ppm: u32) -> EngineResult<Decimal> {
    let complement = ppm_complement(fee_ppm)?;
    let gross = amount
        .checked_mul(Decimal::from(PPM_RESOLUTION))
        .and_then(|scaled| scaled.checked_div(complement))
        .ok_or_else(|| EngineError::Overflow(format!("add_fee({amount}, {fee_ppm})")))?;
    Ok(Rounding::Ceil.apply(gross).normalize())
}

/// Net amount received after the fee.
///
/// `floor(amount * (PPM - fee_ppm) / PPM)`
pub fn subtract_fee(amount: Decimal, fee_ppm: u32) -> EngineResult<Decimal> {
    let complement = ppm_complement(fee_ppm)?;
    let net = amount
        .checked_mul(complement)
        .and_then(|scaled| scaled.checked_div(Decimal::from(PPM_RESOLUTION)))
        .ok_or_else(|| EngineError::Overflow(format!("subtract_fee({amount}, {fee_ppm})")))?;
    Ok(Rounding::Floor.apply(net).normalize())
}

/// Fee settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Trading fee in ppm.
    #[serde(default = "default_trading_fee_ppm")]
    pub trading_fee_ppm: u32,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            trading_fee_ppm: default_trading_fee_ppm(),
        }
    }
}

fn default_trading_fee_ppm() -> u32 {
    DEFAULT_TRADING_FEE_PPM
}

/// Fee calculator bound to one fee tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeCalculator {
    fee_ppm: u32,
}

impl FeeCalculator {
    /// Fails with `InvalidFee` when the fee would consume the whole amount.
    pub fn new(fee_ppm: u32) -> EngineResult<Self> {
        ppm_complement(fee_ppm)?;
        Ok(Self { fee_ppm })
    }

    pub fn from_config(config: &FeeConfig) -> EngineResult<Self> {
        Self::new(config.trading_fee_ppm)
    }

    pub fn fee_ppm(&self) -> u32 {
        self.fee_ppm
    }

    pub fn add_fee(&self, amount: Decimal) -> EngineResult<Decimal> {
        add_fee(amount, self.fee_ppm)
    }

    pub fn subtract_fee(&self, amount: Decimal) -> EngineResult<Decimal> {
        subtract_fee(amount, self.fee_ppm)
    }

    /// Portion of `gross` kept by the protocol.
    pub fn fee_amount(&self, gross: Decimal) -> EngineResult<Decimal> {
        Ok(gross - self.subtract_fee(gross)?)
    }
}

impl Default for FeeCalculator {
    fn default() -> Self {
        Self {
            fee_ppm: DEFAULT_TRADING_FEE_PPM,
        }
    }
}
