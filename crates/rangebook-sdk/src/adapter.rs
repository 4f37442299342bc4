//! Conversion between encoded on-chain strategies and human values.
//!
//! ```text
//! EncodedStrategy ──decode_strategy──► IdentifiedStrategy ──parse_strategy──► Strategy
//! DecodedStrategy ──encode_strategy──► PendingStrategy ──ContractsApi──► chain
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use rangebook_core::{
    normalize_inverted_rate, normalize_rate, Budget, DecodedStrategy, EncodedOrder,
    EncodedStrategy, EngineResult, IdentifiedStrategy, Price, Rate, Strategy, TokenDecimals,
};

use crate::codec::OrderCodec;
use crate::resolver::{resolve_pair, DecimalsResolver};

/// Significant digits kept on parsed sell prices.
///
/// Inverting a rate twice leaves noise around the 28th digit. Buy prices
/// decode by an exact shift and are not rounded.
pub const DISPLAY_SIGNIFICANT_DIGITS: u32 = 24;

/// Encoded orders for a strategy that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingStrategy {
    pub token0: String,
    pub token1: String,
    pub order0: EncodedOrder,
    pub order1: EncodedOrder,
}

impl PendingStrategy {
    /// Attach the id assigned on creation.
    pub fn with_id(self, id: impl Into<String>) -> EncodedStrategy {
        EncodedStrategy {
            id: id.into(),
            token0: self.token0,
            token1: self.token1,
            order0: self.order0,
            order1: self.order1,
        }
    }
}

/// Decode both orders, keeping the raw encoded strategy alongside.
pub fn decode_strategy<C: OrderCodec + ?Sized>(
    encoded: &EncodedStrategy,
    codec: &C,
) -> IdentifiedStrategy {
    IdentifiedStrategy {
        id: encoded.id.clone(),
        token0: encoded.token0.clone(),
        token1: encoded.token1.clone(),
        order0: codec.decode_order(&encoded.order0),
        order1: codec.decode_order(&encoded.order1),
        encoded: encoded.clone(),
    }
}

/// Encode both orders for submission.
pub fn encode_strategy<C: OrderCodec + ?Sized>(
    decoded: &DecodedStrategy,
    codec: &C,
) -> PendingStrategy {
    PendingStrategy {
        token0: decoded.token0.clone(),
        token1: decoded.token1.clone(),
        order0: codec.encode_order(&decoded.order0),
        order1: codec.encode_order(&decoded.order1),
    }
}

/// Convert a decoded strategy into human prices and budgets.
///
/// `token0` is the base token and `token1` the quote token. Both tokens'
/// decimals are fetched concurrently; a lookup failure aborts the call.
pub async fn parse_strategy<R: DecimalsResolver + ?Sized>(
    strategy: &IdentifiedStrategy,
    resolver: &R,
) -> EngineResult<Strategy> {
    let (base_decimals, quote_decimals) =
        resolve_pair(resolver, &strategy.token0, &strategy.token1).await?;
    let parsed = parse_with_decimals(strategy, base_decimals, quote_decimals)?;

    debug!(
        id = %parsed.id,
        base = %parsed.base_token,
        quote = %parsed.quote_token,
        "Strategy parsed"
    );
    Ok(parsed)
}

/// [`parse_strategy`] with decimals already known.
pub fn parse_with_decimals(
    strategy: &IdentifiedStrategy,
    base_decimals: TokenDecimals,
    quote_decimals: TokenDecimals,
) -> EngineResult<Strategy> {
    let buy = &strategy.order1;
    let sell = &strategy.order0;

    let buy_price = |rate: Rate| -> EngineResult<Price> {
        Ok(Price::new(normalize_rate(rate, base_decimals, quote_decimals).to_decimal()?))
    };
    let sell_price = |rate: Rate| -> EngineResult<Price> {
        let value = normalize_inverted_rate(rate, quote_decimals, base_decimals)?.to_decimal()?;
        Ok(Price::new(round_significant(value)))
    };

    Ok(Strategy {
        id: strategy.id.clone(),
        base_token: strategy.token0.clone(),
        quote_token: strategy.token1.clone(),
        buy_price_low: buy_price(buy.lowest_rate)?,
        buy_price_marginal: buy_price(buy.marginal_rate)?,
        buy_price_high: buy_price(buy.highest_rate)?,
        buy_budget: Budget::from_base_units(buy.liquidity, quote_decimals)?,
        // the sell order quotes base per quote, so its highest rate is the
        // lowest price
        sell_price_low: sell_price(sell.highest_rate)?,
        sell_price_marginal: sell_price(sell.marginal_rate)?,
        sell_price_high: sell_price(sell.lowest_rate)?,
        sell_budget: Budget::from_base_units(sell.liquidity, base_decimals)?,
        encoded: strategy.encoded.clone(),
    })
}

fn round_significant(value: Decimal) -> Decimal {
    value
        .round_sf(DISPLAY_SIGNIFICANT_DIGITS)
        .unwrap_or(value)
        .normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::IdentityCodec;
    use crate::resolver::{MockDecimals, StaticDecimals};
    use rangebook_core::EngineError;
    use rangebook_strategy::{build_strategy_object, StrategyParams, TokenPair};
    use rust_decimal_macros::dec;

    const ETH: &str = "0xeth";
    const USDC: &str = "0xusdc";

    fn resolver() -> StaticDecimals {
        StaticDecimals::new().with_token(ETH, 18).with_token(USDC, 6)
    }

    fn params() -> StrategyParams {
        StrategyParams {
            buy_price_low: Price::new(dec!(1800)),
            buy_price_marginal: Price::new(dec!(1900)),
            buy_price_high: Price::new(dec!(2000)),
            buy_budget: Budget::new(dec!(1000)),
            sell_price_low: Price::new(dec!(2000)),
            sell_price_marginal: Price::new(dec!(2100)),
            sell_price_high: Price::new(dec!(2200)),
            sell_budget: Budget::new(dec!(0.5)),
        }
    }

    fn encoded() -> EncodedStrategy {
        let pair = TokenPair::new(ETH, 18, USDC, 6);
        let decoded = build_strategy_object(&pair, &params()).unwrap();
        encode_strategy(&decoded, &IdentityCodec).with_id("42")
    }

    #[test]
    fn test_decode_keeps_raw_encoding() {
        let encoded = encoded();
        let identified = decode_strategy(&encoded, &IdentityCodec);
        assert_eq!(identified.id, "42");
        assert_eq!(identified.encoded, encoded);
        assert_eq!(identified.order1.liquidity, dec!(1000000000));
        assert_eq!(identified.order0.liquidity, dec!(500000000000000000));
    }

    #[tokio::test]
    async fn test_parse_recovers_human_values() {
        let identified = decode_strategy(&encoded(), &IdentityCodec);
        let strategy = parse_strategy(&identified, &resolver()).await.unwrap();

        let expected = params();
        assert_eq!(strategy.base_token, ETH);
        assert_eq!(strategy.quote_token, USDC);
        assert_eq!(strategy.buy_price_low, expected.buy_price_low);
        assert_eq!(strategy.buy_price_marginal, expected.buy_price_marginal);
        assert_eq!(strategy.buy_price_high, expected.buy_price_high);
        assert_eq!(strategy.buy_budget, expected.buy_budget);
        assert_eq!(strategy.sell_price_low, expected.sell_price_low);
        assert_eq!(strategy.sell_price_marginal, expected.sell_price_marginal);
        assert_eq!(strategy.sell_price_high, expected.sell_price_high);
        assert_eq!(strategy.sell_budget, expected.sell_budget);
        assert!(!strategy.is_overlapping());
    }

    #[test]
    fn test_buy_prices_keep_full_precision() {
        let pair = TokenPair::new(ETH, 18, USDC, 6);
        let mut p = params();
        p.buy_price_low = Price::new(dec!(1799.123456789012345678901234));
        p.buy_price_marginal = Price::new(dec!(1899.987654321098765432109876));
        let decoded = build_strategy_object(&pair, &p).unwrap();
        let identified =
            decode_strategy(&encode_strategy(&decoded, &IdentityCodec).with_id("3"), &IdentityCodec);

        let strategy = parse_with_decimals(&identified, 18, 6).unwrap();
        assert_eq!(strategy.buy_price_low, p.buy_price_low);
        assert_eq!(strategy.buy_price_marginal, p.buy_price_marginal);
        assert_eq!(strategy.buy_price_high, p.buy_price_high);
    }

    #[tokio::test]
    async fn test_parse_zero_sell_prices() {
        let pair = TokenPair::new(ETH, 18, USDC, 6);
        let mut p = params();
        p.sell_price_low = Price::ZERO;
        p.sell_price_marginal = Price::ZERO;
        p.sell_price_high = Price::ZERO;
        p.sell_budget = Budget::ZERO;
        let decoded = build_strategy_object(&pair, &p).unwrap();
        let encoded = encode_strategy(&decoded, &IdentityCodec).with_id("1");
        let identified = decode_strategy(&encoded, &IdentityCodec);

        let strategy = parse_strategy(&identified, &resolver()).await.unwrap();
        assert!(strategy.sell_price_low.is_zero());
        assert!(strategy.sell_price_high.is_zero());
        assert!(strategy.sell_budget.is_zero());
    }

    #[tokio::test]
    async fn test_parse_surfaces_lookup_failure() {
        let mock = MockDecimals::new(resolver());
        mock.fail_token(USDC, "execution reverted");
        let identified = decode_strategy(&encoded(), &IdentityCodec);

        let err = parse_strategy(&identified, &mock).await.unwrap_err();
        assert!(err.is_retryable());
        match err {
            EngineError::LookupFailure(lookup) => {
                assert_eq!(lookup.token, USDC);
                assert_eq!(lookup.message, "execution reverted");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_round_significant_strips_inversion_noise() {
        assert_eq!(
            round_significant(dec!(2199.999999999999999999999999)),
            dec!(2200)
        );
        assert_eq!(round_significant(dec!(0.0000000018)), dec!(0.0000000018));
    }
}
