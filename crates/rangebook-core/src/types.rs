//! Strategy data model.
//!
//! Three views of the same strategy:
//! - `DecodedStrategy`: two orders in base units and internal rates
//! - `EncodedStrategy`: the compact form produced by an order codec
//! - `Strategy`: human prices and budgets for display

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Budget, Price};
use crate::rate::Rate;

/// One side of a strategy in base units.
///
/// `liquidity` is an integer amount of the token being sold. Rates are
/// "token bought per token sold" in base-unit space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedOrder {
    pub liquidity: Decimal,
    pub lowest_rate: Rate,
    pub highest_rate: Rate,
    pub marginal_rate: Rate,
}

impl DecodedOrder {
    /// `lowest <= marginal <= highest` with nothing negative.
    pub fn is_ordered(&self) -> bool {
        !self.lowest_rate.is_negative()
            && !self.liquidity.is_sign_negative()
            && self.lowest_rate <= self.marginal_rate
            && self.marginal_rate <= self.highest_rate
    }
}

/// Two orders selling opposite tokens.
///
/// `order0` sells `token0` (base); `order1` sells `token1` (quote).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedStrategy {
    pub token0: String,
    pub token1: String,
    pub order0: DecodedOrder,
    pub order1: DecodedOrder,
}

/// Order in the codec's compact form.
///
/// `y` carries liquidity; `z`, `a` and `b` are rate words whose meaning is
/// defined by the codec that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedOrder {
    pub y: Decimal,
    pub z: Rate,
    #[serde(rename = "A")]
    pub a: Rate,
    #[serde(rename = "B")]
    pub b: Rate,
}

/// Strategy as stored on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedStrategy {
    pub id: String,
    pub token0: String,
    pub token1: String,
    pub order0: EncodedOrder,
    pub order1: EncodedOrder,
}

/// Decoded orders tagged with the strategy id and the raw encoded form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifiedStrategy {
    pub id: String,
    pub token0: String,
    pub token1: String,
    pub order0: DecodedOrder,
    pub order1: DecodedOrder,
    pub encoded: EncodedStrategy,
}

/// Human view of a strategy.
///
/// Prices are quote per base. `buy_budget` is in quote units and
/// `sell_budget` in base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub id: String,
    pub base_token: String,
    pub quote_token: String,
    pub buy_price_low: Price,
    pub buy_price_marginal: Price,
    pub buy_price_high: Price,
    pub buy_budget: Budget,
    pub sell_price_low: Price,
    pub sell_price_marginal: Price,
    pub sell_price_high: Price,
    pub sell_budget: Budget,
    pub encoded: EncodedStrategy,
}

impl Strategy {
    /// Buy and sell ranges intersect (touching does not count).
    pub fn is_overlapping(&self) -> bool {
        self.buy_price_high > self.sell_price_low
    }
}
