//! MPG Model Trainer
//!
//! One-shot batch training: load the vehicle dataset, encode it, filter
//! outliers, fit the scaler and the forest, and persist the artifact bundle.

mod dataset;
mod pipeline;

pub use dataset::{load_dataset, DatasetRow};
pub use pipeline::{TrainingConfig, TrainingPipeline, TrainingReport};

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Errors that abort a training run
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("Dataset read failed: {0}")]
    Dataset(#[from] csv::Error),

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Column {0} has no usable values")]
    EmptyColumn(&'static str),

    #[error("All rows were flagged as outliers")]
    EmptyAfterFilter,

    #[error("Not enough rows to split a test set from: {0}")]
    InsufficientRows(usize),

    #[error("Dataset matrix shape is inconsistent")]
    Shape,

    #[error("Scaling failed: {0}")]
    Encode(#[from] feature_encoder::EncodeError),

    #[error("Outlier filter failed: {0}")]
    Filter(#[from] outlier_filter::FilterError),

    #[error("Model fitting failed: {0}")]
    Model(#[from] regressor::ModelError),

    #[error("Artifact save failed: {0}")]
    Artifact(#[from] artifact_store::ArtifactError),
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Build the training configuration, layering `MPG_*` environment
/// overrides over the defaults (e.g. `MPG_DATASET_PATH`,
/// `MPG_FOREST__N_ESTIMATORS`).
pub fn load_config() -> Result<TrainingConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(
            config::Environment::with_prefix("MPG")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}
