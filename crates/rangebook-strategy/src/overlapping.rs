//! Overlapping distribution solver.
//!
//! Derives a full two-sided strategy from one outer range
//! `[buy_price_low, sell_price_high]`, the current market price and a
//! spread percentage:
//!
//! ```text
//! buy_price_low        sell_price_low           buy_price_high   sell_price_high
//!      |<── spread ──>|                                |<── spread ──>|
//!      |================== buy range =================|
//!                     |================== sell range ==================|
//! ```
//!
//! The two budgets are coupled through the geometric mean of the outer
//! bounds, so only the buy budget is an input.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use rangebook_core::{Budget, EngineError, EngineResult, Price, TokenDecimals};

use crate::builder::StrategyParams;

/// Outer bounds, market price and spread of an overlapping strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlappingRange {
    pub buy_price_low: Price,
    pub sell_price_high: Price,
    pub market_price: Price,
    /// Share of the outer range left between the two sides, in percent.
    pub spread_percentage: Decimal,
}

/// Solver output, trimmed to token precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlappingDistribution {
    pub buy_price_high: Price,
    pub buy_price_marginal: Price,
    pub sell_price_low: Price,
    pub sell_price_marginal: Price,
    pub sell_budget: Budget,
}

impl OverlappingDistribution {
    /// Full parameter set for the order builder.
    pub fn into_params(self, range: &OverlappingRange, buy_budget: Budget) -> StrategyParams {
        StrategyParams {
            buy_price_low: range.buy_price_low,
            buy_price_marginal: self.buy_price_marginal,
            buy_price_high: self.buy_price_high,
            buy_budget,
            sell_price_low: self.sell_price_low,
            sell_price_marginal: self.sell_price_marginal,
            sell_price_high: range.sell_price_high,
            sell_budget: self.sell_budget,
        }
    }
}

/// Budget-independent part of the curve.
#[derive(Debug)]
struct Curve {
    buy_price_high: Decimal,
    sell_price_low: Decimal,
    buy_price_marginal: Decimal,
    sell_price_marginal: Decimal,
    /// Fraction of the buy range below the market price, in `(0, 1]`.
    buy_low_budget_ratio: Decimal,
    geo_mean: Decimal,
}

impl OverlappingRange {
    fn validate(&self) -> EngineResult<()> {
        for (field, price) in [
            ("buy_price_low", self.buy_price_low),
            ("sell_price_high", self.sell_price_high),
            ("market_price", self.market_price),
        ] {
            if price.is_negative() {
                return Err(EngineError::InvalidPrice(format!("{field} is negative: {price}")));
            }
        }
        if self.spread_percentage.is_sign_negative() && !self.spread_percentage.is_zero() {
            return Err(EngineError::InvalidSpread(format!(
                "spread percentage is negative: {}",
                self.spread_percentage
            )));
        }
        if self.buy_price_low > self.sell_price_high {
            return Err(EngineError::InvalidPriceOrdering(format!(
                "buy_price_low {} above sell_price_high {}",
                self.buy_price_low, self.sell_price_high
            )));
        }
        if self.buy_price_low == self.sell_price_high {
            return Err(EngineError::DegenerateRange(format!(
                "empty outer range at {}",
                self.buy_price_low
            )));
        }
        if self.spread_percentage >= dec!(100) {
            return Err(EngineError::DegenerateRange(format!(
                "spread {}% leaves no buy range",
                self.spread_percentage
            )));
        }
        if self.buy_price_low.is_zero() {
            return Err(EngineError::DegenerateRange(
                "buy_price_low of zero has no geometric mean".to_string(),
            ));
        }
        Ok(())
    }

    fn solve(&self) -> EngineResult<Curve> {
        self.validate()?;

        let buy_price_low = self.buy_price_low.inner();
        let sell_price_high = self.sell_price_high.inner();
        let market_price = self.market_price.inner();

        let total_range = checked(sell_price_high.checked_sub(buy_price_low), "outer range")?;
        let spread_fraction = checked(self.spread_percentage.checked_div(dec!(100)), "spread")?;
        let spread = checked(total_range.checked_mul(spread_fraction), "spread")?;
        let half_spread = checked(spread.checked_div(Decimal::TWO), "spread")?;

        let buy_price_high = checked(sell_price_high.checked_sub(spread), "buy_price_high")?;
        let sell_price_low = checked(buy_price_low.checked_add(spread), "sell_price_low")?;

        let buy_low_range = checked(
            market_price
                .checked_sub(buy_price_low)
                .and_then(|d| d.checked_sub(half_spread)),
            "buy range below market",
        )?;
        let buy_range = checked(buy_price_high.checked_sub(buy_price_low), "buy range")?;
        let buy_low_budget_ratio = checked(buy_low_range.checked_div(buy_range), "budget ratio")?;
        if buy_low_budget_ratio <= Decimal::ZERO || buy_low_budget_ratio > Decimal::ONE {
            return Err(EngineError::MarketPriceOutOfRange(format!(
                "market price {market_price} outside ({}, {}]",
                buy_price_low.saturating_add(half_spread),
                buy_price_high.saturating_add(half_spread)
            )));
        }

        let buy_price_marginal = checked(
            buy_range
                .checked_mul(buy_low_budget_ratio)
                .and_then(|d| buy_price_low.checked_add(d)),
            "buy_price_marginal",
        )?;
        let sell_high_budget_ratio = Decimal::ONE - buy_low_budget_ratio;
        let sell_price_marginal = checked(
            sell_price_high
                .checked_sub(sell_price_low)
                .and_then(|d| d.checked_mul(sell_high_budget_ratio))
                .and_then(|d| sell_price_high.checked_sub(d)),
            "sell_price_marginal",
        )?;

        // Product of the square roots: the product of two tiny bounds
        // underflows to zero
        let geo_mean = match (buy_price_low.sqrt(), sell_price_high.sqrt()) {
            (Some(low_root), Some(high_root)) => {
                checked(low_root.checked_mul(high_root), "geometric mean")?
            }
            _ => Decimal::ZERO,
        };
        if geo_mean.is_zero() {
            return Err(EngineError::DegenerateRange(format!(
                "geometric mean of {buy_price_low} and {sell_price_high} is zero"
            )));
        }

        Ok(Curve {
            buy_price_high,
            sell_price_low,
            buy_price_marginal,
            sell_price_marginal,
            buy_low_budget_ratio,
            geo_mean,
        })
    }
}

fn checked(value: Option<Decimal>, what: &str) -> EngineResult<Decimal> {
    value.ok_or_else(|| EngineError::Overflow(what.to_string()))
}

/// Derive marginal prices, inner bounds and the sell budget from the buy
/// budget.
///
/// Prices are trimmed to `quote_decimals` and the sell budget to
/// `base_decimals`; trimming never rounds up.
pub fn calculate_overlapping_distribution(
    range: &OverlappingRange,
    buy_budget: Budget,
    quote_decimals: TokenDecimals,
    base_decimals: TokenDecimals,
) -> EngineResult<OverlappingDistribution> {
    if buy_budget.is_negative() {
        return Err(EngineError::InvalidBudget(format!(
            "buy_budget is negative: {buy_budget}"
        )));
    }
    let curve = range.solve()?;

    // y-intercepts of the two linear budget curves
    let buy_order_yint = buy_budget
        .inner()
        .checked_div(curve.buy_low_budget_ratio)
        .ok_or_else(|| EngineError::Overflow(format!("buy budget {buy_budget} y-intercept")))?;
    let sell_high_budget_ratio = Decimal::ONE - curve.buy_low_budget_ratio;
    let sell_budget = checked(
        buy_order_yint
            .checked_div(curve.geo_mean)
            .and_then(|sell_order_yint| sell_order_yint.checked_mul(sell_high_budget_ratio)),
        "sell budget",
    )?;

    debug!(
        market_price = %range.market_price,
        spread_percentage = %range.spread_percentage,
        ratio = %curve.buy_low_budget_ratio,
        %sell_budget,
        "Overlapping distribution solved"
    );

    Ok(OverlappingDistribution {
        buy_price_high: Price::new(curve.buy_price_high).trimmed(quote_decimals),
        buy_price_marginal: Price::new(curve.buy_price_marginal).trimmed(quote_decimals),
        sell_price_low: Price::new(curve.sell_price_low).trimmed(quote_decimals),
        sell_price_marginal: Price::new(curve.sell_price_marginal).trimmed(quote_decimals),
        sell_budget: Budget::new(sell_budget).trimmed(base_decimals),
    })
}

/// Inverse of the budget coupling: the buy budget (quote units) that pairs
/// with `sell_budget` (base units) on the same curve.
pub fn calculate_overlapping_buy_budget(
    range: &OverlappingRange,
    sell_budget: Budget,
    quote_decimals: TokenDecimals,
) -> EngineResult<Budget> {
    if sell_budget.is_negative() {
        return Err(EngineError::InvalidBudget(format!(
            "sell_budget is negative: {sell_budget}"
        )));
    }
    let curve = range.solve()?;

    let sell_high_budget_ratio = Decimal::ONE - curve.buy_low_budget_ratio;
    if sell_high_budget_ratio.is_zero() {
        return Err(EngineError::DegenerateRange(
            "market price at the top of the range leaves no sell curve".to_string(),
        ));
    }
    let buy_order_yint = sell_budget
        .inner()
        .checked_div(sell_high_budget_ratio)
        .and_then(|sell_order_yint| sell_order_yint.checked_mul(curve.geo_mean))
        .ok_or_else(|| EngineError::Overflow(format!("sell budget {sell_budget} y-intercept")))?;
    let buy_budget = checked(
        buy_order_yint.checked_mul(curve.buy_low_budget_ratio),
        "buy budget",
    )?;

    Ok(Budget::new(buy_budget).trimmed(quote_decimals))
}
