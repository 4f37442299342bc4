//! Prometheus metrics and structured logging for rangebook.
//!
//! - `init_logging` installs a `tracing` subscriber (JSON in production)
//! - `Metrics` records strategy construction, validation rejections and
//!   decimals lookups

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
