//! Prometheus metrics for the catalog service
//!
//! Defines metrics for:
//! - Request counts by route and status
//! - Storage operation counts and duration
//! - Days inspected and days qualifying during availability scans

use lazy_static::lazy_static;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use std::time::Instant;

lazy_static! {
    /// Registry for all metrics
    pub static ref REGISTRY: Registry = Registry::new();

    /// HTTP request counter by route and status
    pub static ref HTTP_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("pilot_http_requests_total", "Total HTTP requests"),
        &["route", "status"]
    )
    .expect("Failed to create HTTP_REQUESTS metric");

    /// Storage operation counter by operation and status
    pub static ref STORAGE_OPERATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("pilot_storage_operations_total", "Total storage operations"),
        &["operation", "status"]
    )
    .expect("Failed to create STORAGE_OPERATIONS metric");

    /// Storage operation duration histogram
    pub static ref STORAGE_OPERATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "pilot_storage_operation_duration_seconds",
            "Storage operation duration in seconds"
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0])
    )
    .expect("Failed to create STORAGE_OPERATION_DURATION metric");

    /// Days whose frame folder was listed by a scan
    pub static ref SCAN_DAYS_INSPECTED: IntCounter = IntCounter::new(
        "pilot_scan_days_inspected_total",
        "Days inspected by availability scans"
    )
    .expect("Failed to create SCAN_DAYS_INSPECTED metric");

    /// Days found above the size threshold
    pub static ref SCAN_DAYS_QUALIFYING: IntCounter = IntCounter::new(
        "pilot_scan_days_qualifying_total",
        "Days above the availability size threshold"
    )
    .expect("Failed to create SCAN_DAYS_QUALIFYING metric");
}

/// Initialize metrics and register with the global registry
pub fn init_metrics() -> Result<(), prometheus::Error> {
    REGISTRY.register(Box::new(HTTP_REQUESTS.clone()))?;
    REGISTRY.register(Box::new(STORAGE_OPERATIONS.clone()))?;
    REGISTRY.register(Box::new(STORAGE_OPERATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(SCAN_DAYS_INSPECTED.clone()))?;
    REGISTRY.register(Box::new(SCAN_DAYS_QUALIFYING.clone()))?;
    Ok(())
}

/// Record the outcome of one storage call started at `started`
pub fn observe_storage<T, E>(operation: &str, started: Instant, result: &Result<T, E>) {
    let status = if result.is_ok() { "ok" } else { "error" };
    STORAGE_OPERATIONS
        .with_label_values(&[operation, status])
        .inc();
    STORAGE_OPERATION_DURATION.observe(started.elapsed().as_secs_f64());
}

/// Count a finished HTTP request
pub fn observe_request(route: &str, status: u16) {
    HTTP_REQUESTS
        .with_label_values(&[route, &status.to_string()])
        .inc();
}
