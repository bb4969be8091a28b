//! Metrics collection and exposition.
//!
//! # Metrics
//! - `guard_login_attempts_total` (counter): login pre-flights by outcome
//! - `guard_rate_limited_total` (counter): attempts refused by the limiter
//! - `guard_validation_failures_total` (counter): rejected cliente payloads
//! - `guard_suspicious_input_total` (counter): flagged values by source
//! - `guard_session_events_total` (counter): warnings and expiries

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::session::{ExpiryReason, SessionEvent};

/// Start the Prometheus exporter. Must run inside a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_login_attempt(outcome: &'static str) {
    counter!("guard_login_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_rate_limited() {
    counter!("guard_rate_limited_total").increment(1);
}

pub fn record_validation_failure(errors: usize) {
    counter!("guard_validation_failures_total").increment(1);
    tracing::debug!(errors, "Cliente payload failed validation");
}

pub fn record_suspicious_input(source: &'static str) {
    counter!("guard_suspicious_input_total", "source" => source).increment(1);
}

pub fn record_session_event(event: &SessionEvent) {
    let label = match event {
        SessionEvent::WarningDue => "warning",
        SessionEvent::Expired(ExpiryReason::Inactivity) => "expired",
        SessionEvent::Expired(ExpiryReason::Declined) => "declined",
    };
    counter!("guard_session_events_total", "event" => label).increment(1);
}
