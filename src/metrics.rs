//! Counters and latency histograms for scan passes.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! host installs a recorder.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram, Histogram};
use tracing::debug;

// === Metric Name Constants ===

/// Scan pass latency metric name.
pub const METRIC_SCAN_LATENCY: &str = "scan_latency_ms";
/// Feed fetch latency metric name.
pub const METRIC_FEED_FETCH_LATENCY: &str = "feed_fetch_latency_ms";
/// Events scanned counter metric name.
pub const METRIC_EVENTS_SCANNED: &str = "events_scanned_total";
/// Rejected catalog records counter metric name.
pub const METRIC_RECORDS_REJECTED: &str = "catalog_records_rejected_total";
/// Opportunities detected counter metric name.
pub const METRIC_OPPORTUNITIES_DETECTED: &str = "opportunities_detected_total";

/// Describe every metric to whichever recorder is installed.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_SCAN_LATENCY,
        "Time to aggregate, detect and allocate one catalog in milliseconds"
    );
    describe_histogram!(
        METRIC_FEED_FETCH_LATENCY,
        "Odds feed fetch latency in milliseconds"
    );

    describe_counter!(METRIC_EVENTS_SCANNED, "Total number of events scanned");
    describe_counter!(
        METRIC_RECORDS_REJECTED,
        "Total number of malformed catalog records skipped"
    );
    describe_counter!(
        METRIC_OPPORTUNITIES_DETECTED,
        "Total number of arbitrage opportunities detected"
    );

    debug!("Metric descriptions registered");
}

/// Record odds feed fetch latency.
pub fn record_feed_fetch_latency(start: Instant) {
    histogram!(METRIC_FEED_FETCH_LATENCY).record(millis_since(start));
}

/// Add to the events scanned counter.
pub fn add_events_scanned(count: usize) {
    counter!(METRIC_EVENTS_SCANNED).increment(count as u64);
}

/// Increment rejected records counter.
pub fn inc_records_rejected() {
    counter!(METRIC_RECORDS_REJECTED).increment(1);
}

/// Add to the opportunities detected counter.
pub fn add_opportunities_detected(count: usize) {
    counter!(METRIC_OPPORTUNITIES_DETECTED).increment(count as u64);
}

/// Records the time from creation to drop into a latency histogram.
pub struct LatencyTimer {
    histogram: Histogram,
    started: Instant,
}

impl LatencyTimer {
    /// Start timing against `metric_name`.
    pub fn start(metric_name: &'static str) -> Self {
        Self {
            histogram: histogram!(metric_name),
            started: Instant::now(),
        }
    }

    /// Milliseconds since the timer started.
    pub fn elapsed_ms(&self) -> f64 {
        millis_since(self.started)
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        self.histogram.record(self.elapsed_ms());
    }
}

/// Timer for one scan pass.
pub fn timer_scan() -> LatencyTimer {
    LatencyTimer::start(METRIC_SCAN_LATENCY)
}

fn millis_since(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
