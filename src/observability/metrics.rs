//! Metrics helpers for the authentication path.
//!
//! Counters are emitted through the `metrics` facade; whatever recorder the
//! embedding process installs (or none) picks them up.

use metrics::counter;

/// Record the outcome of a login attempt.
pub fn record_authentication(outcome: &'static str) {
    counter!("gatehouse_auth_attempts_total", "outcome" => outcome).increment(1);
}

/// Record the outcome of a gate session check.
pub fn record_session_check(outcome: &'static str) {
    counter!("gatehouse_session_checks_total", "outcome" => outcome).increment(1);
}

/// Record a forced session revocation.
pub fn record_session_revocation(trigger: &'static str) {
    counter!("gatehouse_session_revocations_total", "trigger" => trigger).increment(1);
}
