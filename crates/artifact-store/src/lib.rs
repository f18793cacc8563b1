//! Artifact Store
//!
//! Persists the model/scaler/schema artifact bundle produced by a training
//! run. The three artifacts are written all-or-nothing and loaded together;
//! mixing artifacts from different runs is rejected.

mod bundle;
mod store;

pub use bundle::{ArtifactMeta, ModelBundle, COLUMNS_FILE, MODEL_FILE, SCALER_FILE};
pub use store::ArtifactStore;

use std::path::PathBuf;
use thiserror::Error;

/// Errors during artifact persistence
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// One of the bundle files is absent
    #[error("Artifact missing: {}", .0.display())]
    Missing(PathBuf),

    /// The three artifacts carry different bundle ids
    #[error("Artifact bundle mismatch: {0}")]
    BundleMismatch(String),

    #[error("Artifact IO failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact decode failed: {0}")]
    Decode(String),

    #[error("Artifact encode failed: {0}")]
    Encode(String),
}
