//! Span and metric bookkeeping for façade operations
//!
//! Spans are opened with `operation.success`, `operation.duration_ms` and
//! `error.kind` declared as `tracing::field::Empty`; the tracker fills them in
//! once the outcome is known.

use std::time::{Duration, Instant};
use tracing::Span;

use crate::error::{ErrorKind, Operation};
use crate::observability::metrics;

/// Records span attributes and metrics for a successful operation
pub fn record_success_metrics(span: &Span, operation: Operation, duration: Duration) {
    span.record("operation.duration_ms", duration.as_millis() as u64);
    span.record("operation.success", true);
    metrics::record_secret_operation(operation, duration.as_secs_f64());
}

/// Records span attributes and metrics for a failed operation
pub fn record_error_metrics(
    span: &Span,
    operation: Operation,
    kind: ErrorKind,
    duration: Duration,
) {
    span.record("operation.success", false);
    span.record("error.kind", kind.as_str());
    span.record("operation.duration_ms", duration.as_millis() as u64);
    metrics::record_secret_operation(operation, duration.as_secs_f64());
    metrics::increment_operation_errors(operation, kind);
}

/// Helper struct for tracking operation state
#[derive(Debug)]
pub struct OperationTracker {
    operation: Operation,
    start: Instant,
    span: Span,
}

impl OperationTracker {
    pub fn new(operation: Operation, span: Span) -> Self {
        Self {
            operation,
            start: Instant::now(),
            span,
        }
    }

    pub fn record_success(&self) {
        record_success_metrics(&self.span, self.operation, self.start.elapsed());
    }

    pub fn record_error(&self, kind: ErrorKind) {
        record_error_metrics(&self.span, self.operation, kind, self.start.elapsed());
    }

    /// Record the outcome of `result` and hand it back unchanged
    pub fn finish<T, E>(
        &self,
        result: Result<T, E>,
        kind_of: impl Fn(&E) -> ErrorKind,
    ) -> Result<T, E> {
        match &result {
            Ok(_) => self.record_success(),
            Err(e) => self.record_error(kind_of(e)),
        }
        result
    }
}
