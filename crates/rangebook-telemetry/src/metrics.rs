//! Prometheus metrics for strategy construction.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A failure there means a duplicate
//! metric name, which is a programming error caught on first use.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::TelemetryResult;

/// Strategies successfully built.
/// Labels: kind (buy_sell/overlapping)
pub static STRATEGIES_BUILT_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rangebook_strategies_built_total",
        "Total strategies built",
        &["kind"]
    )
    .unwrap()
});

/// Inputs rejected before any order was built.
/// Labels: kind (error kind, e.g. invalid_price)
pub static VALIDATION_REJECTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rangebook_validation_rejected_total",
        "Total strategy requests rejected by validation",
        &["kind"]
    )
    .unwrap()
});

/// Token decimals lookups.
/// Labels: result (hit/miss/failure)
pub static DECIMALS_LOOKUP_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rangebook_decimals_lookup_total",
        "Total token decimals lookups",
        &["result"]
    )
    .unwrap()
});

/// Strategy submissions to the contracts API.
/// Labels: result (ok/error)
pub static SUBMISSIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rangebook_submissions_total",
        "Total strategy submissions",
        &["result"]
    )
    .unwrap()
});

/// Time spent resolving both tokens' decimals, in milliseconds.
pub static DECIMALS_RESOLVE_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "rangebook_decimals_resolve_ms",
        "Latency of resolving a token pair's decimals in milliseconds",
        &["operation"],
        vec![0.1, 0.5, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0]
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record a built strategy.
    pub fn strategy_built(kind: &str) {
        STRATEGIES_BUILT_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record a validation rejection by error kind.
    pub fn validation_rejected(kind: &str) {
        VALIDATION_REJECTED_TOTAL.with_label_values(&[kind]).inc();
    }

    pub fn decimals_cache_hit() {
        DECIMALS_LOOKUP_TOTAL.with_label_values(&["hit"]).inc();
    }

    pub fn decimals_cache_miss() {
        DECIMALS_LOOKUP_TOTAL.with_label_values(&["miss"]).inc();
    }

    pub fn decimals_lookup_failed() {
        DECIMALS_LOOKUP_TOTAL.with_label_values(&["failure"]).inc();
    }

    /// Record a submission outcome.
    pub fn submission(ok: bool) {
        let result = if ok { "ok" } else { "error" };
        SUBMISSIONS_TOTAL.with_label_values(&[result]).inc();
    }

    pub fn decimals_resolved(operation: &str, elapsed_ms: f64) {
        DECIMALS_RESOLVE_MS
            .with_label_values(&[operation])
            .observe(elapsed_ms);
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
