//! # Observability
//!
//! - `metrics`: Prometheus metrics collection
//! - `tracker`: per-operation span and metric recording

pub mod metrics;
pub mod tracker;

pub use metrics::{register_metrics, render_text};
pub use tracker::OperationTracker;
