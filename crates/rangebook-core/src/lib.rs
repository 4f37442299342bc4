//! Core numeric types for the rangebook strategy engine.
//!
//! This crate provides the foundation every other crate builds on:
//! - `Price`, `Budget`: precision-safe human-unit values
//! - Base-unit conversion with caller-chosen `Rounding`
//! - Rate normalization between human prices and internal order rates
//! - The decoded/encoded/human strategy data model

pub mod decimal;
pub mod error;
pub mod rate;
pub mod types;

pub use decimal::{
    from_base_units, ten_pow, to_base_units, trim_decimal, Budget, Price, Rounding, TokenDecimals,
};
pub use error::{EngineError, EngineResult, LookupError};
pub use rate::{normalize_inverted_rate, normalize_rate, Rate};
pub use types::{
    DecodedOrder, DecodedStrategy, EncodedOrder, EncodedStrategy, IdentifiedStrategy, Strategy,
};
