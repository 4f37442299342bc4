//! Proportional trading fees in parts-per-million.
//!
//! Both directions round in the protocol's favour: grossing up rounds up,
//! netting down rounds down.

pub mod fee;

pub use fee::{
    add_fee, subtract_fee, FeeCalculator, FeeConfig, DEFAULT_TRADING_FEE_PPM, PPM_RESOLUTION,
};
