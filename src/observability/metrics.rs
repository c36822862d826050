//! # Metrics
//!
//! Prometheus metrics for the secret client.
//!
//! ## Metrics Exposed
//!
//! - `knock_secret_operations_total` - Total number of façade operations by operation
//! - `knock_secret_operation_errors_total` - Total number of failed operations by operation
//!   and error kind
//! - `knock_secret_operation_duration_seconds` - Duration of façade operations by operation

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

use crate::error::{ErrorKind, Operation};

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static SECRET_OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "knock_secret_operations_total",
            "Total number of secret operations by operation",
        ),
        &["operation"],
    )
    .expect("Failed to create SECRET_OPERATIONS_TOTAL metric - this should never happen")
});

static SECRET_OPERATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "knock_secret_operation_errors_total",
            "Total number of failed secret operations by operation and error kind",
        ),
        &["operation", "kind"],
    )
    .expect("Failed to create SECRET_OPERATION_ERRORS_TOTAL metric - this should never happen")
});

static SECRET_OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "knock_secret_operation_duration_seconds",
            "Duration of secret operations in seconds by operation",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["operation"],
    )
    .expect("Failed to create SECRET_OPERATION_DURATION metric - this should never happen")
});

/// Register every metric with the crate registry
///
/// Calling this more than once is harmless.
///
/// # Errors
/// Returns an error if a metric cannot be registered for any reason other
/// than already being registered
pub fn register_metrics() -> Result<(), prometheus::Error> {
    let collectors: [Box<dyn prometheus::core::Collector>; 3] = [
        Box::new(SECRET_OPERATIONS_TOTAL.clone()),
        Box::new(SECRET_OPERATION_ERRORS_TOTAL.clone()),
        Box::new(SECRET_OPERATION_DURATION.clone()),
    ];
    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Record a completed operation and its duration
pub fn record_secret_operation(operation: Operation, duration_secs: f64) {
    SECRET_OPERATIONS_TOTAL
        .with_label_values(&[operation.as_str()])
        .inc();
    SECRET_OPERATION_DURATION
        .with_label_values(&[operation.as_str()])
        .observe(duration_secs);
}

/// Increment the error counter for an operation
pub fn increment_operation_errors(operation: Operation, kind: ErrorKind) {
    SECRET_OPERATION_ERRORS_TOTAL
        .with_label_values(&[operation.as_str(), kind.as_str()])
        .inc();
}

/// Render the registry in the Prometheus text exposition format
///
/// # Errors
/// Returns an error if encoding fails
pub fn render_text() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
