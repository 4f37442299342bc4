//! Error types for the pricing engine.

use thiserror::Error;

/// Failure reported by a token-decimals resolver.
///
/// Carried verbatim inside [`EngineError::LookupFailure`] so callers can
/// tell an unavailable dependency apart from bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decimals lookup for {token} failed: {message}")]
pub struct LookupError {
    pub token: String,
    pub message: String,
}

impl LookupError {
    pub fn new(token: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            message: message.into(),
        }
    }
}

/// Engine error types.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid price ordering: {0}")]
    InvalidPriceOrdering(String),

    #[error("Invalid budget: {0}")]
    InvalidBudget(String),

    #[error("Degenerate range: {0}")]
    DegenerateRange(String),

    #[error("Invalid spread: {0}")]
    InvalidSpread(String),

    #[error("Market price out of range: {0}")]
    MarketPriceOutOfRange(String),

    #[error("Invalid fee: {0} ppm")]
    InvalidFee(u32),

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Lookup failure: {0}")]
    LookupFailure(#[from] LookupError),
}

impl EngineError {
    /// Only external lookups may succeed on retry; everything else needs
    /// corrected input.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::LookupFailure(_))
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidPrice(_) => "invalid_price",
            EngineError::InvalidPriceOrdering(_) => "invalid_price_ordering",
            EngineError::InvalidBudget(_) => "invalid_budget",
            EngineError::DegenerateRange(_) => "degenerate_range",
            EngineError::InvalidSpread(_) => "invalid_spread",
            EngineError::MarketPriceOutOfRange(_) => "market_price_out_of_range",
            EngineError::InvalidFee(_) => "invalid_fee",
            EngineError::Overflow(_) => "overflow",
            EngineError::DecimalParse(_) => "decimal_parse",
            EngineError::LookupFailure(_) => "lookup_failure",
        }
    }
}

/// Result type alias for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
