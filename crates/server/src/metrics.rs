//! Prometheus metrics for observability.
//!
//! Conversion counts and latencies are labeled by outcome and strategy so
//! every internal failure cause stays distinguishable in telemetry even
//! though the HTTP surface collapses them.

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Conversions by outcome ("success" or an error class) and strategy.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("morpho_conversions_total", "Total conversion requests"),
        &["outcome", "strategy"],
    )
    .unwrap()
});

/// Conversion duration in seconds, by outcome.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "morpho_conversion_duration_seconds",
            "Conversion duration in seconds",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["outcome"],
    )
    .unwrap()
});

/// Total bytes accepted through the upload surface.
pub static UPLOAD_BYTES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("morpho_upload_bytes_total", "Total uploaded bytes").unwrap()
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(CONVERSIONS_TOTAL.clone()))
        .expect("register conversions_total");
    registry
        .register(Box::new(CONVERSION_DURATION.clone()))
        .expect("register conversion_duration");
    registry
        .register(Box::new(UPLOAD_BYTES_TOTAL.clone()))
        .expect("register upload_bytes_total");
}

/// Renders the registry in the Prometheus text format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
