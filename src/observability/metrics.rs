//! Decision metrics.
//!
//! # Metrics
//! - `interceptor_decisions_total` (counter): calls by outcome (redirect, or the bypass reason)
//! - `interceptor_failsafe_trips_total` (counter): breaker transitions to open
//! - `interceptor_proxy_errors_total` (counter): proxy-side failures by error code
//!   ("1" to "5", anything else is "unknown")
//! - `interceptor_retries_total` (counter): proxy-requested retries that were honoured
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the host installs the exporter
//! - Without an installed recorder every call is a no-op

use metrics::counter;

pub fn record_decision(outcome: &'static str) {
    counter!("interceptor_decisions_total", "outcome" => outcome).increment(1);
}

pub fn record_failsafe_trip() {
    counter!("interceptor_failsafe_trips_total").increment(1);
}

/// `code` must come from a fixed set, see `ProxyError::code_label`.
pub fn record_proxy_error(code: &'static str) {
    counter!("interceptor_proxy_errors_total", "code" => code).increment(1);
}

pub fn record_retry() {
    counter!("interceptor_retries_total").increment(1);
}
