//! Prometheus metrics for the polling loop.
//!
//! This module provides metrics for:
//! - Snapshot fetch and bet submission latency
//! - Poll, incomplete book and opportunity counts
//! - Plan rejections by reason
//! - The last observed overround

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info};

// === Metric Name Constants ===

/// Bet submission latency metric name.
pub const METRIC_ORDER_SUBMIT_LATENCY: &str = "order_submit_latency_ms";
/// Snapshot fetch latency metric name.
pub const METRIC_SNAPSHOT_FETCH_LATENCY: &str = "snapshot_fetch_latency_ms";
/// Polls counter metric name.
pub const METRIC_POLLS: &str = "polls_total";
/// Incomplete books counter metric name.
pub const METRIC_INCOMPLETE_BOOKS: &str = "incomplete_books_total";
/// Opportunities detected counter metric name.
pub const METRIC_OPPORTUNITIES_DETECTED: &str = "opportunities_detected_total";
/// Rejected plans counter metric name.
pub const METRIC_PLANS_REJECTED: &str = "plans_rejected_total";
/// Submitted plans counter metric name.
pub const METRIC_PLANS_SUBMITTED: &str = "plans_submitted_total";
/// Orders failed counter metric name.
pub const METRIC_ORDERS_FAILED: &str = "orders_failed_total";
/// Overround gauge metric name.
pub const METRIC_OVERROUND: &str = "overround_pct";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    // Latency histograms
    describe_histogram!(
        METRIC_ORDER_SUBMIT_LATENCY,
        "Bet batch submission latency in milliseconds"
    );
    describe_histogram!(
        METRIC_SNAPSHOT_FETCH_LATENCY,
        "Market snapshot fetch latency in milliseconds"
    );

    // Counters
    describe_counter!(METRIC_POLLS, "Total number of market polls");
    describe_counter!(
        METRIC_INCOMPLETE_BOOKS,
        "Total number of snapshots with an unpriced runner"
    );
    describe_counter!(
        METRIC_OPPORTUNITIES_DETECTED,
        "Total number of snapshots that crossed the trigger"
    );
    describe_counter!(
        METRIC_PLANS_REJECTED,
        "Total number of triggered plans refused, by reason"
    );
    describe_counter!(
        METRIC_PLANS_SUBMITTED,
        "Total number of bet batches submitted"
    );
    describe_counter!(
        METRIC_ORDERS_FAILED,
        "Total number of bets that failed"
    );

    describe_gauge!(METRIC_OVERROUND, "Most recent book percentage");

    debug!("Metrics initialized");
}

/// Install the Prometheus exporter on the given port.
///
/// Must run inside a Tokio runtime; the listener is spawned onto it.
pub fn install_exporter(port: u16) -> Result<(), String> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| e.to_string())?;
    info!(%addr, "Prometheus exporter listening");
    Ok(())
}

/// Record bet submission latency.
pub fn record_order_submit_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_ORDER_SUBMIT_LATENCY).record(latency_ms);
}

/// Increment polls counter.
pub fn inc_polls() {
    counter!(METRIC_POLLS).increment(1);
}

/// Increment incomplete books counter.
pub fn inc_incomplete_books() {
    counter!(METRIC_INCOMPLETE_BOOKS).increment(1);
}

/// Increment opportunities detected counter.
pub fn inc_opportunities_detected() {
    counter!(METRIC_OPPORTUNITIES_DETECTED).increment(1);
}

/// Increment rejected plans counter.
pub fn inc_plans_rejected(reason: &'static str) {
    counter!(METRIC_PLANS_REJECTED, "reason" => reason).increment(1);
}

/// Increment submitted plans counter.
pub fn inc_plans_submitted() {
    counter!(METRIC_PLANS_SUBMITTED).increment(1);
}

/// Increment orders failed counter.
pub fn inc_orders_failed() {
    counter!(METRIC_ORDERS_FAILED).increment(1);
}

/// Set the overround gauge.
pub fn set_overround(overround: Decimal) {
    gauge!(METRIC_OVERROUND).set(overround.to_f64().unwrap_or_default());
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name).record(latency_ms);
    }
}

/// Create a latency timer for snapshot fetches.
pub fn timer_snapshot_fetch() -> LatencyTimer {
    LatencyTimer::new(METRIC_SNAPSHOT_FETCH_LATENCY)
}
