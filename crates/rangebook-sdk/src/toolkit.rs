//! High-level strategy operations.
//!
//! [`Toolkit`] wires a decimals resolver, an order codec and a contracts
//! backend around the pure builders in `rangebook-strategy`.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use rangebook_core::{
    Budget, DecodedStrategy, EncodedStrategy, EngineError, EngineResult, Price, Strategy,
};
use rangebook_strategy::{
    build_strategy_object, calculate_overlapping_distribution, OverlappingRange, StrategyConfig,
    StrategyParams, TokenPair,
};
use rangebook_telemetry::Metrics;

use crate::adapter::{decode_strategy, encode_strategy, parse_strategy};
use crate::codec::DynOrderCodec;
use crate::contracts::{DynContractsApi, TxHandle, TxOverrides};
use crate::error::SdkResult;
use crate::resolver::{resolve_pair, DynDecimalsResolver};

const KIND_BUY_SELL: &str = "buy_sell";
const KIND_OVERLAPPING: &str = "overlapping";

pub struct Toolkit {
    resolver: DynDecimalsResolver,
    codec: DynOrderCodec,
    contracts: DynContractsApi,
    config: StrategyConfig,
}

impl Toolkit {
    pub fn new(
        resolver: DynDecimalsResolver,
        codec: DynOrderCodec,
        contracts: DynContractsApi,
    ) -> Self {
        Self {
            resolver,
            codec,
            contracts,
            config: StrategyConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StrategyConfig) -> Self {
        self.config = config;
        self
    }

    /// Overlapping range with the spread defaulted and bounded by config.
    pub fn overlapping_range(
        &self,
        buy_price_low: Price,
        sell_price_high: Price,
        market_price: Price,
        spread_percentage: Option<Decimal>,
    ) -> EngineResult<OverlappingRange> {
        let spread_percentage = self.config.resolve_spread(spread_percentage)?;
        Ok(OverlappingRange {
            buy_price_low,
            sell_price_high,
            market_price,
            spread_percentage,
        })
    }

    /// Resolve decimals, build both orders and submit them.
    pub async fn create_buy_sell_strategy(
        &self,
        base_token: &str,
        quote_token: &str,
        params: &StrategyParams,
        overrides: TxOverrides,
    ) -> SdkResult<TxHandle> {
        let pair = self.resolve(base_token, quote_token).await?;
        let decoded = rejecting(build_strategy_object(&pair, params))?;
        self.submit(KIND_BUY_SELL, &decoded, overrides).await
    }

    /// Solve the overlapping distribution for `buy_budget`, then build and
    /// submit it like a buy/sell strategy.
    pub async fn create_overlapping_strategy(
        &self,
        base_token: &str,
        quote_token: &str,
        range: &OverlappingRange,
        buy_budget: Budget,
        overrides: TxOverrides,
    ) -> SdkResult<TxHandle> {
        rejecting(self.config.resolve_spread(Some(range.spread_percentage)))?;
        let pair = self.resolve(base_token, quote_token).await?;

        let distribution = rejecting(calculate_overlapping_distribution(
            range,
            buy_budget,
            pair.quote_decimals,
            pair.base_decimals,
        ))?;
        let params = distribution.into_params(range, buy_budget);
        let decoded = rejecting(build_strategy_object(&pair, &params))?;
        self.submit(KIND_OVERLAPPING, &decoded, overrides).await
    }

    /// Decode and parse an on-chain strategy into human values.
    pub async fn get_strategy(&self, encoded: &EncodedStrategy) -> SdkResult<Strategy> {
        let identified = decode_strategy(encoded, self.codec.as_ref());
        Ok(parse_strategy(&identified, self.resolver.as_ref()).await?)
    }

    async fn resolve(&self, base_token: &str, quote_token: &str) -> EngineResult<TokenPair> {
        let (base_decimals, quote_decimals) =
            resolve_pair(self.resolver.as_ref(), base_token, quote_token).await?;
        debug!(
            base = %base_token,
            quote = %quote_token,
            base_decimals,
            quote_decimals,
            "Token decimals resolved"
        );
        Ok(TokenPair::new(
            base_token,
            base_decimals,
            quote_token,
            quote_decimals,
        ))
    }

    async fn submit(
        &self,
        kind: &'static str,
        decoded: &DecodedStrategy,
        overrides: TxOverrides,
    ) -> SdkResult<TxHandle> {
        let pending = encode_strategy(decoded, self.codec.as_ref());
        let result = self
            .contracts
            .create_strategy(
                &pending.token0,
                &pending.token1,
                (pending.order0, pending.order1),
                overrides,
            )
            .await;
        Metrics::submission(result.is_ok());

        match result {
            Ok(handle) => {
                Metrics::strategy_built(kind);
                info!(
                    kind,
                    base = %pending.token0,
                    quote = %pending.token1,
                    tx = %handle.hash,
                    "Strategy submitted"
                );
                Ok(handle)
            }
            Err(err) => {
                warn!(
                    kind,
                    error = %err,
                    retryable = err.is_retryable(),
                    "Strategy submission failed"
                );
                Err(err.into())
            }
        }
    }
}

/// Count validation failures before handing them back.
pub fn rejecting<T>(result: EngineResult<T>) -> EngineResult<T> {
    result.map_err(|err: EngineError| {
        Metrics::validation_rejected(err.kind());
        err
    })
}
