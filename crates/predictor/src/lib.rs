//! MPG Prediction Service
//!
//! The library boundary a serving layer calls: holds the immutable artifact
//! bundle and runs the deterministic encode → align → scale → predict →
//! interpret path for one record at a time.

mod interpret;
mod service;

pub use interpret::{interpret, MpgCategory};
pub use service::{MpgPredictor, Prediction};

use thiserror::Error;

/// Errors surfaced to the serving boundary
#[derive(Debug, Error)]
pub enum PredictError {
    /// Malformed or out-of-domain input field; recoverable at the boundary
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] vehicle_record::RecordError),

    /// The loaded schema does not cover the encoder's deterministic columns;
    /// the bundle belongs to a different pipeline
    #[error("Schema mismatch: column {0} missing from the trained schema")]
    SchemaMismatch(String),

    #[error("Feature scaling failed: {0}")]
    Scale(#[from] feature_encoder::EncodeError),

    #[error("Model prediction failed: {0}")]
    Model(#[from] regressor::ModelError),

    #[error("Artifact bundle unavailable: {0}")]
    Artifact(#[from] artifact_store::ArtifactError),

    /// Recovery training failed; fatal, reported rather than retried
    #[error("Training recovery failed: {0}")]
    Training(#[from] trainer::TrainingError),
}
