//! Metrics and observability utilities
//!
//! Prometheus counters with standardized naming conventions.

use metrics::{counter, describe_counter, Unit};

/// Metrics prefix for all CalcTree metrics
pub const METRICS_PREFIX: &str = "calctree";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_calculations_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total calculation nodes created"
    );

    describe_counter!(
        format!("{}_calculations_rejected_total", METRICS_PREFIX),
        Unit::Count,
        "Total calculation requests rejected by a business rule"
    );

    describe_counter!(
        format!("{}_users_registered_total", METRICS_PREFIX),
        Unit::Count,
        "Total users registered"
    );

    describe_counter!(
        format!("{}_logins_total", METRICS_PREFIX),
        Unit::Count,
        "Total login attempts"
    );

    tracing::info!("Metrics registered");
}

/// Record a created calculation node
pub fn record_calculation_created(kind: &'static str) {
    counter!(
        format!("{}_calculations_created_total", METRICS_PREFIX),
        "kind" => kind
    )
    .increment(1);
}

/// Record a calculation rejected by a business rule
pub fn record_calculation_rejected(reason: &'static str) {
    counter!(
        format!("{}_calculations_rejected_total", METRICS_PREFIX),
        "reason" => reason
    )
    .increment(1);
}

/// Record a completed registration
pub fn record_registration() {
    counter!(format!("{}_users_registered_total", METRICS_PREFIX)).increment(1);
}

/// Record a login attempt
pub fn record_login(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        format!("{}_logins_total", METRICS_PREFIX),
        "status" => status
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorders_do_not_panic_without_exporter() {
        register_metrics();
        record_calculation_created("start");
        record_calculation_rejected("division_by_zero");
        record_registration();
        record_login(true);
        record_login(false);
    }
}
