use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, Encoder, Histogram, IntCounter, TextEncoder};

use crate::errors::ServiceError;

// Prometheus metrics (default registry)
pub static AGGREGATIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "vendor_reviews_aggregations_total",
        "Total aggregate requests served"
    )
    .expect("register aggregations_total")
});

pub static DIRECTORY_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "vendor_reviews_directory_failures_total",
        "Listing directory lookups that failed or timed out"
    )
    .expect("register directory_failures_total")
});

pub static LISTING_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "vendor_reviews_listing_failures_total",
        "Listings excluded from an aggregate because their review fetch failed"
    )
    .expect("register listing_failures_total")
});

pub static STALE_RESPONSES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "vendor_reviews_stale_responses_total",
        "Feed responses dropped because a newer request was issued"
    )
    .expect("register stale_responses_total")
});

pub static AGGREGATION_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "vendor_reviews_aggregation_duration_seconds",
        "Aggregate request duration in seconds",
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register aggregation_duration")
});

/// Render the default registry in the text exposition format.
pub fn encode_metrics() -> Result<String, ServiceError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ServiceError::Metrics(e.to_string()))?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}
