//! Training-Data Outlier Filter
//!
//! Isolation-based anomaly scoring over the fully encoded feature matrix.
//! Training-only: inference never filters.

mod isolation;

pub use isolation::{retain_inliers, IsolationForest, IsolationForestConfig};

use thiserror::Error;

/// Errors during outlier filtering
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Cannot fit isolation forest on an empty matrix")]
    EmptyMatrix,
    #[error("Isolation forest has not been fitted")]
    NotFitted,
    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
