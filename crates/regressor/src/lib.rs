//! Regression Model
//!
//! Ensemble of CART regression trees trained on bootstrap samples;
//! predictions average the individual trees.

mod forest;
mod metrics;
mod tree;

pub use forest::{ForestConfig, RandomForestRegressor};
pub use metrics::r_squared;
pub use tree::RegressionTree;

use thiserror::Error;

/// Errors during model fitting and prediction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Model has not been fitted")]
    NotFitted,
    #[error("Cannot fit with zero samples")]
    EmptyTrainingSet,
    #[error("Sample count mismatch: {x_rows} feature rows vs {y_len} targets")]
    SampleMismatch { x_rows: usize, y_len: usize },
    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
