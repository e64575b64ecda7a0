//! Numerical utilities shared by the model and the pipeline.

pub mod metrics;
pub mod ols;
pub mod stats;

pub use metrics::{calculate_metrics, AccuracyMetrics};
pub use ols::{ridge_fit, RidgeResult};
pub use stats::z_for_interval;
