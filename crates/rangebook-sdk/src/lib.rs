//! Strategy codec adapter and toolkit for rangebook.
//!
//! External dependencies sit behind three object-safe traits:
//! - [`DecimalsResolver`]: token decimals lookup
//! - [`OrderCodec`]: on-chain order encoding
//! - [`ContractsApi`]: strategy submission
//!
//! [`Toolkit`] combines them with the builders in `rangebook-strategy`.

pub mod adapter;
pub mod codec;
pub mod contracts;
pub mod error;
pub mod resolver;
pub mod toolkit;

pub use adapter::{
    decode_strategy, encode_strategy, parse_strategy, parse_with_decimals, PendingStrategy,
    DISPLAY_SIGNIFICANT_DIGITS,
};
pub use codec::{DynOrderCodec, IdentityCodec, OrderCodec};
pub use contracts::{
    ContractsApi, DynContractsApi, MockContractsApi, SubmittedStrategy, TxHandle, TxOverrides,
};
pub use error::{SdkError, SdkResult, SubmitError};
pub use resolver::{
    resolve_pair, BoxFuture, CachedDecimals, DecimalsResolver, DynDecimalsResolver, MockDecimals,
    StaticDecimals,
};
pub use toolkit::{rejecting, Toolkit};
