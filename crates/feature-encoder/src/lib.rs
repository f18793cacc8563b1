//! Feature Encoding Engine
//!
//! Turns a typed vehicle record into the fixed-width numeric vector the
//! regression model expects: numeric passthrough columns, one-hot indicators
//! for the low-cardinality categoricals, and a hashed brand block.

mod encoder;
mod scaler;
mod schema;

pub use encoder::{
    encode, hash_brand, indicator_column, FeatureMap, BRAND_COLUMN_PREFIX, BRAND_HASH_DIMENSION,
    NUMERIC_COLUMNS,
};
pub use scaler::StandardScaler;
pub use schema::{align, ColumnSchema, CATEGORICAL_FIELDS};

use thiserror::Error;

/// Errors during encoding and scaling
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("Cannot fit scaler on an empty matrix")]
    EmptyMatrix,
    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
