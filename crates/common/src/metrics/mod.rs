//! Metrics and observability utilities
//!
//! Prometheus metrics via the `metrics` facade with standardized naming.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all service metrics
pub const METRICS_PREFIX: &str = "ecfr";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_counter!(
        format!("{}_agency_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Total agency listing queries"
    );

    describe_counter!(
        format!("{}_summary_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total AI summary requests"
    );

    describe_counter!(
        format!("{}_summary_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total AI summary provider errors"
    );

    describe_histogram!(
        format!("{}_summary_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "AI summary provider latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record an agency listing query and whether it was filtered
pub fn record_agency_query(filtered: bool) {
    counter!(
        format!("{}_agency_queries_total", METRICS_PREFIX),
        "filtered" => filtered.to_string()
    )
    .increment(1);
}

/// Record an AI summary request outcome
pub fn record_summary(duration_secs: f64, model: &str, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_summary_requests_total", METRICS_PREFIX),
        "model" => model.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    if success {
        histogram!(
            format!("{}_summary_duration_seconds", METRICS_PREFIX),
            "model" => model.to_string()
        )
        .record(duration_secs);
    } else {
        counter!(
            format!("{}_summary_errors_total", METRICS_PREFIX),
            "model" => model.to_string()
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("GET", "/agencies");
        std::thread::sleep(std::time::Duration::from_millis(5));
        metrics.finish(200);
        // Just verify it runs without panic
    }

    #[test]
    fn test_summary_metrics() {
        record_summary(0.5, "gpt-3.5-turbo", true);
        record_summary(0.1, "gpt-3.5-turbo", false);
    }
}
