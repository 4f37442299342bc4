//! Subcommand definitions and execution.

use std::path::{Path, PathBuf};

use clap::{ArgGroup, Args, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use rangebook_core::{Budget, EncodedStrategy, Price};
use rangebook_fee::FeeCalculator;
use rangebook_sdk::{decode_strategy, parse_strategy, rejecting, resolve_pair, IdentityCodec};
use rangebook_strategy::{
    build_strategy_object, calculate_overlapping_buy_budget, calculate_overlapping_distribution,
    OverlappingDistribution, OverlappingRange, StrategyParams, TokenPair,
};
use rangebook_telemetry::Metrics;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build both orders from explicit buy and sell ranges, printed as JSON
    Build(BuildArgs),
    /// Solve an overlapping distribution, printed as JSON
    Overlap(OverlapArgs),
    /// Parse an encoded strategy JSON file into human prices and budgets
    Decode {
        /// Path to an encoded strategy (id, token0, token1, order0, order1)
        #[arg(long)]
        file: PathBuf,
    },
    /// Trading fee arithmetic
    Fee {
        #[command(subcommand)]
        op: FeeOp,
    },
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Base token address
    #[arg(long)]
    pub base: String,
    /// Quote token address
    #[arg(long)]
    pub quote: String,
    #[arg(long)]
    pub buy_low: Price,
    /// Defaults to --buy-high
    #[arg(long)]
    pub buy_marginal: Option<Price>,
    #[arg(long)]
    pub buy_high: Price,
    /// Quote token amount
    #[arg(long)]
    pub buy_budget: Budget,
    #[arg(long)]
    pub sell_low: Price,
    /// Defaults to --sell-low
    #[arg(long)]
    pub sell_marginal: Option<Price>,
    #[arg(long)]
    pub sell_high: Price,
    /// Base token amount
    #[arg(long)]
    pub sell_budget: Budget,
}

impl BuildArgs {
    fn params(&self) -> StrategyParams {
        StrategyParams {
            buy_price_low: self.buy_low,
            buy_price_marginal: self.buy_marginal.unwrap_or(self.buy_high),
            buy_price_high: self.buy_high,
            buy_budget: self.buy_budget,
            sell_price_low: self.sell_low,
            sell_price_marginal: self.sell_marginal.unwrap_or(self.sell_low),
            sell_price_high: self.sell_high,
            sell_budget: self.sell_budget,
        }
    }
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("budget")
        .required(true)
        .args(["buy_budget", "sell_budget"])
))]
pub struct OverlapArgs {
    /// Base token address
    #[arg(long)]
    pub base: String,
    /// Quote token address
    #[arg(long)]
    pub quote: String,
    #[arg(long)]
    pub buy_low: Price,
    #[arg(long)]
    pub sell_high: Price,
    #[arg(long)]
    pub market: Price,
    /// Percent of the outer range; defaults to the configured spread
    #[arg(long)]
    pub spread: Option<Decimal>,
    /// Quote token amount
    #[arg(long)]
    pub buy_budget: Option<Budget>,
    /// Base token amount; the matching buy budget is derived from it
    #[arg(long)]
    pub sell_budget: Option<Budget>,
}

#[derive(Debug, Subcommand)]
pub enum FeeOp {
    /// Gross amount needed to net AMOUNT after the fee (rounds up)
    Add {
        amount: Decimal,
        /// Overrides the configured fee
        #[arg(long)]
        fee_ppm: Option<u32>,
    },
    /// Net amount left from AMOUNT after the fee (rounds down)
    Sub {
        amount: Decimal,
        /// Overrides the configured fee
        #[arg(long)]
        fee_ppm: Option<u32>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OverlapOutput {
    buy_budget: Budget,
    #[serde(flatten)]
    distribution: OverlappingDistribution,
}

/// Execute one command and return what should be printed.
pub async fn run(command: Command, config: &AppConfig) -> AppResult<String> {
    match command {
        Command::Build(args) => build(&args, config).await,
        Command::Overlap(args) => overlap(&args, config).await,
        Command::Decode { file } => decode(&file, config).await,
        Command::Fee { op } => fee(op, config),
    }
}

async fn build(args: &BuildArgs, config: &AppConfig) -> AppResult<String> {
    let pair = resolve(config, &args.base, &args.quote).await?;
    let decoded = rejecting(build_strategy_object(&pair, &args.params()))?;
    Metrics::strategy_built("buy_sell");
    info!(base = %pair.base_token, quote = %pair.quote_token, "Strategy built");
    Ok(serde_json::to_string_pretty(&decoded)?)
}

async fn overlap(args: &OverlapArgs, config: &AppConfig) -> AppResult<String> {
    let spread_percentage = rejecting(config.strategy.resolve_spread(args.spread))?;
    let pair = resolve(config, &args.base, &args.quote).await?;
    let range = OverlappingRange {
        buy_price_low: args.buy_low,
        sell_price_high: args.sell_high,
        market_price: args.market,
        spread_percentage,
    };

    let buy_budget = match (args.buy_budget, args.sell_budget) {
        (Some(buy_budget), None) => buy_budget,
        (None, Some(sell_budget)) => rejecting(calculate_overlapping_buy_budget(
            &range,
            sell_budget,
            pair.quote_decimals,
        ))?,
        _ => {
            return Err(AppError::InvalidArgs(
                "exactly one of --buy-budget or --sell-budget is required".to_string(),
            ))
        }
    };
    let distribution = rejecting(calculate_overlapping_distribution(
        &range,
        buy_budget,
        pair.quote_decimals,
        pair.base_decimals,
    ))?;
    Metrics::strategy_built("overlapping");

    Ok(serde_json::to_string_pretty(&OverlapOutput {
        buy_budget,
        distribution,
    })?)
}

async fn decode(file: &Path, config: &AppConfig) -> AppResult<String> {
    let content = std::fs::read_to_string(file)?;
    let encoded: EncodedStrategy = serde_json::from_str(&content)?;
    let identified = decode_strategy(&encoded, &IdentityCodec);
    let strategy = parse_strategy(&identified, &config.resolver()).await?;
    Ok(serde_json::to_string_pretty(&strategy)?)
}

fn fee(op: FeeOp, config: &AppConfig) -> AppResult<String> {
    let (amount, fee_ppm, add) = match op {
        FeeOp::Add { amount, fee_ppm } => (amount, fee_ppm, true),
        FeeOp::Sub { amount, fee_ppm } => (amount, fee_ppm, false),
    };
    let calculator = match fee_ppm {
        Some(ppm) => FeeCalculator::new(ppm)?,
        None => FeeCalculator::from_config(&config.fee)?,
    };
    let result = if add {
        calculator.add_fee(amount)?
    } else {
        calculator.subtract_fee(amount)?
    };
    debug!(%amount, fee_ppm = calculator.fee_ppm(), %result, "Fee applied");
    Ok(result.to_string())
}

async fn resolve(config: &AppConfig, base: &str, quote: &str) -> AppResult<TokenPair> {
    let (base_decimals, quote_decimals) = resolve_pair(&config.resolver(), base, quote).await?;
    Ok(TokenPair::new(base, base_decimals, quote, quote_decimals))
}
