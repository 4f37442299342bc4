//! Direct strategy construction from explicit buy and sell ranges.

use serde::{Deserialize, Serialize};
use tracing::debug;

use rangebook_core::{
    normalize_inverted_rate, normalize_rate, Budget, DecodedOrder, DecodedStrategy, EngineError,
    EngineResult, Price, TokenDecimals,
};

/// Base/quote token addresses with their decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub base_token: String,
    pub quote_token: String,
    pub base_decimals: TokenDecimals,
    pub quote_decimals: TokenDecimals,
}

impl TokenPair {
    pub fn new(
        base_token: impl Into<String>,
        base_decimals: TokenDecimals,
        quote_token: impl Into<String>,
        quote_decimals: TokenDecimals,
    ) -> Self {
        Self {
            base_token: base_token.into(),
            quote_token: quote_token.into(),
            base_decimals,
            quote_decimals,
        }
    }
}

/// Human-unit strategy parameters.
///
/// Prices are quote per base. `buy_budget` is denominated in the quote token
/// and `sell_budget` in the base token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyParams {
    pub buy_price_low: Price,
    pub buy_price_marginal: Price,
    pub buy_price_high: Price,
    pub buy_budget: Budget,
    pub sell_price_low: Price,
    pub sell_price_marginal: Price,
    pub sell_price_high: Price,
    pub sell_budget: Budget,
}

impl StrategyParams {
    /// Both marginal prices sit at the edge where a fresh order starts
    /// filling: the top of the buy range and the bottom of the sell range.
    pub fn with_default_marginals(
        buy_price_low: Price,
        buy_price_high: Price,
        buy_budget: Budget,
        sell_price_low: Price,
        sell_price_high: Price,
        sell_budget: Budget,
    ) -> Self {
        Self {
            buy_price_low,
            buy_price_marginal: buy_price_high,
            buy_price_high,
            buy_budget,
            sell_price_low,
            sell_price_marginal: sell_price_low,
            sell_price_high,
            sell_budget,
        }
    }

    fn prices(&self) -> [(&'static str, Price); 6] {
        [
            ("buy_price_low", self.buy_price_low),
            ("buy_price_marginal", self.buy_price_marginal),
            ("buy_price_high", self.buy_price_high),
            ("sell_price_low", self.sell_price_low),
            ("sell_price_marginal", self.sell_price_marginal),
            ("sell_price_high", self.sell_price_high),
        ]
    }
}

/// Validate human parameters and build both orders.
///
/// Checks run in a fixed order so the reported error is deterministic:
/// 1. any negative price → `InvalidPrice`
/// 2. `low <= marginal <= high` broken on a side → `InvalidPriceOrdering`
/// 3. any negative budget → `InvalidBudget`
pub fn build_strategy_object(
    pair: &TokenPair,
    params: &StrategyParams,
) -> EngineResult<DecodedStrategy> {
    if let Some((field, price)) = params.prices().into_iter().find(|(_, p)| p.is_negative()) {
        return Err(EngineError::InvalidPrice(format!("{field} is negative: {price}")));
    }

    check_side_ordering(
        "buy",
        params.buy_price_low,
        params.buy_price_marginal,
        params.buy_price_high,
    )?;
    check_side_ordering(
        "sell",
        params.sell_price_low,
        params.sell_price_marginal,
        params.sell_price_high,
    )?;

    if params.buy_budget.is_negative() {
        return Err(EngineError::InvalidBudget(format!(
            "buy_budget is negative: {}",
            params.buy_budget
        )));
    }
    if params.sell_budget.is_negative() {
        return Err(EngineError::InvalidBudget(format!(
            "sell_budget is negative: {}",
            params.sell_budget
        )));
    }

    create_orders(pair, params)
}

fn check_side_ordering(side: &str, low: Price, marginal: Price, high: Price) -> EngineResult<()> {
    if low <= marginal && marginal <= high {
        return Ok(());
    }
    Err(EngineError::InvalidPriceOrdering(format!(
        "{side} side requires low <= marginal <= high, got {low} / {marginal} / {high}"
    )))
}

/// Build both orders without validating the inputs.
///
/// `order0` sells the base token, so its rates are inverted sell prices and
/// the range flips: the highest sell price becomes the lowest rate.
/// `order1` sells the quote token at the buy prices directly.
pub fn create_orders(pair: &TokenPair, params: &StrategyParams) -> EngineResult<DecodedStrategy> {
    let (base_decimals, quote_decimals) = (pair.base_decimals, pair.quote_decimals);
    let invert =
        |price: Price| normalize_inverted_rate(price.inner(), quote_decimals, base_decimals);
    let direct = |price: Price| normalize_rate(price.inner(), quote_decimals, base_decimals);

    let order0 = DecodedOrder {
        liquidity: params.sell_budget.to_base_units(base_decimals)?,
        lowest_rate: invert(params.sell_price_high)?,
        highest_rate: invert(params.sell_price_low)?,
        marginal_rate: invert(params.sell_price_marginal)?,
    };

    let order1 = DecodedOrder {
        liquidity: params.buy_budget.to_base_units(quote_decimals)?,
        lowest_rate: direct(params.buy_price_low),
        highest_rate: direct(params.buy_price_high),
        marginal_rate: direct(params.buy_price_marginal),
    };

    debug!(
        base = %pair.base_token,
        quote = %pair.quote_token,
        sell_liquidity = %order0.liquidity,
        buy_liquidity = %order1.liquidity,
        "Orders created"
    );

    Ok(DecodedStrategy {
        token0: pair.base_token.clone(),
        token1: pair.quote_token.clone(),
        order0,
        order1,
    })
}
