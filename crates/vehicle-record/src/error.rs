//! Record Parsing Error Types

use thiserror::Error;

/// Errors raised while parsing a raw vehicle record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// Field is empty or absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Numeric field failed to parse
    #[error("{field} value {value:?} is not a valid number")]
    InvalidNumber {
        field: &'static str,
        value: String,
    },

    /// Categorical field outside the enumerated set
    #[error("{field} value {value:?} is not a recognized category")]
    UnknownCategory {
        field: &'static str,
        value: String,
    },

    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
