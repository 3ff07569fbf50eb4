//! Prometheus metrics for the deployment receiver
//!
//! A process-global registry tracks deployment outcomes, failure reasons,
//! and pipeline durations, served as text on the configured metrics path.

use lazy_static::lazy_static;
use prometheus::{
    opts, Encoder, Histogram, HistogramOpts, IntCounterVec, Registry, TextEncoder,
};
use tracing::debug;

use crate::types::Error;

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref REGISTRY: Registry = Registry::new();

    /// Total number of deployment requests by outcome (succeeded, failed)
    pub static ref DEPLOYMENT_TOTAL: IntCounterVec = IntCounterVec::new(
        opts!("deployment_total", "Total number of deployment requests"),
        &["outcome"]
    )
    .expect("Failed to create deployment_total metric");

    /// Deployment failures by reason
    pub static ref DEPLOYMENT_FAILURE_TOTAL: IntCounterVec = IntCounterVec::new(
        opts!("deployment_failure_total", "Deployment failures by reason"),
        &["reason"]
    )
    .expect("Failed to create deployment_failure_total metric");

    /// End-to-end pipeline duration, dominated by the script run
    pub static ref DEPLOYMENT_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "deployment_duration_seconds",
            "End-to-end deployment pipeline duration"
        )
        .buckets(vec![0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0])
    )
    .expect("Failed to create deployment_duration_seconds metric");
}

/// Register all metrics with the global registry. Call once at startup.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(DEPLOYMENT_TOTAL.clone()))
        .expect("Failed to register deployment_total");
    REGISTRY
        .register(Box::new(DEPLOYMENT_FAILURE_TOTAL.clone()))
        .expect("Failed to register deployment_failure_total");
    REGISTRY
        .register(Box::new(DEPLOYMENT_DURATION_SECONDS.clone()))
        .expect("Failed to register deployment_duration_seconds");

    debug!("Metrics registry initialized");
}

/// Record a finished deployment attempt
pub fn record_deployment(result: &crate::types::Result<crate::deploy::DeployReport>) {
    match result {
        Ok(report) => {
            DEPLOYMENT_TOTAL.with_label_values(&["succeeded"]).inc();
            DEPLOYMENT_DURATION_SECONDS.observe(report.script.duration_ms as f64 / 1000.0);
        }
        Err(e) => {
            DEPLOYMENT_TOTAL.with_label_values(&["failed"]).inc();
            DEPLOYMENT_FAILURE_TOTAL
                .with_label_values(&[failure_reason(e)])
                .inc();
        }
    }
}

/// Stable label for a failure category
pub fn failure_reason(error: &Error) -> &'static str {
    match error {
        Error::Unauthorized => "unauthorized",
        Error::Stale { .. } => "stale",
        Error::Upload(_) => "invalid_upload",
        Error::Storage(_) => "storage",
        Error::Execution(_) => "execution",
        Error::Validation { .. } => "validation",
        Error::Config(_) => "config",
        Error::Io(_) => "io",
        Error::Application(_) => "internal",
    }
}

/// Encode all registered metrics in the Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
