// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the NowIP DNS core.
//!
//! All metrics use the namespace prefix `nowip_dns_`.
//!
//! # Metrics Categories
//!
//! - **Query Metrics** - Resolutions by the source that produced the answer
//! - **Zone Metrics** - Current serial and number of operator records
//! - **NOTIFY Metrics** - Delivery outcomes per secondary
//!
//! # Example
//!
//! ```rust,no_run
//! use nowip_dns::metrics::{gather_metrics, record_query};
//!
//! record_query("zone", std::time::Duration::from_micros(40));
//! let text = gather_metrics().unwrap();
//! assert!(text.contains("nowip_dns_queries_total"));
//! ```

use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics
const METRICS_NAMESPACE: &str = "nowip_dns";

/// Answer produced from the static zone
pub const SOURCE_ZONE: &str = "zone";
/// Answer produced from a domain's last dynamic-update address
pub const SOURCE_DYNAMIC: &str = "dynamic";
/// Answer produced from the additional record store
pub const SOURCE_ADDITIONAL: &str = "additional";
/// Name outside the zone, unknown type or unregistered domain
pub const SOURCE_NONE: &str = "none";
/// A backing store failed during the lookup
pub const SOURCE_ERROR: &str = "error";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Query Metrics
// ============================================================================

/// Total number of resolutions by answer source
///
/// Labels:
/// - `source`: `zone`, `dynamic`, `additional`, `none` or `error`
pub static QUERIES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_queries_total"),
        "Total number of resolutions by answer source",
    );
    let counter = CounterVec::new(opts, &["source"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of resolutions in seconds
///
/// Labels:
/// - `source`: same values as [`QUERIES_TOTAL`]
pub static QUERY_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_query_duration_seconds"),
        "Duration of resolutions in seconds by answer source",
    )
    .buckets(vec![0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]);
    let histogram = HistogramVec::new(opts, &["source"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Zone Metrics
// ============================================================================

/// Current SOA serial of the zone
pub static ZONE_SERIAL: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_zone_serial"),
        "Current SOA serial of the zone",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Number of records loaded from the custom records file
pub static CUSTOM_RECORDS: LazyLock<Gauge> = LazyLock::new(|| {
    let gauge = Gauge::new(
        format!("{METRICS_NAMESPACE}_custom_records"),
        "Number of records loaded from the custom records file",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// NOTIFY Metrics
// ============================================================================

/// Total number of NOTIFY messages by outcome
///
/// Labels:
/// - `status`: `success` or the failure reason code (e.g. `NotifySendFailed`)
pub static NOTIFY_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_notify_total"),
        "Total number of NOTIFY messages sent to secondaries by outcome",
    );
    let counter = CounterVec::new(opts, &["status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a completed resolution
///
/// # Arguments
/// * `source` - Which lookup produced the answer (see the `SOURCE_*` constants)
/// * `duration` - Time spent resolving
pub fn record_query(source: &str, duration: Duration) {
    QUERIES_TOTAL.with_label_values(&[source]).inc();
    QUERY_DURATION_SECONDS
        .with_label_values(&[source])
        .observe(duration.as_secs_f64());
}

/// Publish the current zone serial
pub fn record_serial(serial: u32) {
    ZONE_SERIAL.set(f64::from(serial));
}

/// Publish the number of custom records in the zone
pub fn record_custom_records(count: usize) {
    #[allow(clippy::cast_precision_loss)]
    CUSTOM_RECORDS.set(count as f64);
}

/// Record the outcome of one NOTIFY send
///
/// # Arguments
/// * `status` - `success` or an error reason code
pub fn record_notify(status: &str) {
    NOTIFY_TOTAL.with_label_values(&[status]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
