use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder, HistogramVec,
    IntCounter, IntCounterVec, TextEncoder,
};

// Prometheus metrics (default registry)
pub static UPSTREAM_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "admin_dashboard_upstream_requests_total",
        "Upstream calls issued, by service and path",
        &["service", "path"]
    )
    .expect("register upstream_requests_total")
});

pub static UPSTREAM_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "admin_dashboard_upstream_errors_total",
        "Upstream calls that ended in an error, by service and error kind",
        &["service", "kind"]
    )
    .expect("register upstream_errors_total")
});

pub static UPSTREAM_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "admin_dashboard_upstream_duration_seconds",
        "Upstream call duration in seconds, retries included",
        &["service"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register upstream_duration")
});

pub static UPSTREAM_RETRIES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "admin_dashboard_upstream_retries_total",
        "Upstream retry attempts"
    )
    .expect("register upstream_retries_total")
});

pub static JOIN_UNMATCHED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "admin_dashboard_join_unmatched_total",
        "Best-seller rows with no product info"
    )
    .expect("register join_unmatched_total")
});

/// Render the default registry in the Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
