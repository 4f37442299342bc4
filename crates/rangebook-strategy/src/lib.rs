//! Strategy construction for rangebook.
//!
//! Turns human buy/sell ranges into the two base-unit orders a strategy is
//! stored as:
//! - Direct construction from explicit ranges and budgets
//! - Overlapping construction from one outer range, a market price and a
//!   spread
//!
//! # Data flow
//!
//! ```text
//! OverlappingRange ──► calculate_overlapping_distribution ──┐
//!                                                            ▼
//! StrategyParams ───► build_strategy_object ──► validate ──► create_orders
//!                                                            │
//!                                                            ▼
//!                                                   DecodedStrategy
//! ```

pub mod builder;
pub mod config;
pub mod overlapping;

pub use builder::{build_strategy_object, create_orders, StrategyParams, TokenPair};
pub use config::StrategyConfig;
pub use overlapping::{
    calculate_overlapping_buy_budget, calculate_overlapping_distribution,
    OverlappingDistribution, OverlappingRange,
};
