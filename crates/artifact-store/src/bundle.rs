//! Bundle Types

use chrono::{DateTime, Utc};
use feature_encoder::{ColumnSchema, StandardScaler};
use regressor::RandomForestRegressor;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Binary model artifact file name
pub const MODEL_FILE: &str = "mpg_model.bin";
/// Scaler state artifact file name
pub const SCALER_FILE: &str = "scaler.json";
/// Column schema artifact file name
pub const COLUMNS_FILE: &str = "columns.json";

/// Identity shared by the three artifacts of one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    /// Random id stamped into every artifact at save time
    pub bundle_id: Uuid,
    /// When the training run finished
    pub trained_at: DateTime<Utc>,
}

impl ArtifactMeta {
    /// Mint a fresh bundle identity
    pub fn new() -> Self {
        Self {
            bundle_id: Uuid::new_v4(),
            trained_at: Utc::now(),
        }
    }
}

impl Default for ArtifactMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// The immutable model bundle a prediction service holds.
///
/// Schema, scaler, and forest are coupled to the same training run; column
/// order and scaling only make sense against the exact training-time
/// feature set. Read-only after load and safe to share across threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub meta: ArtifactMeta,
    pub schema: ColumnSchema,
    pub scaler: StandardScaler,
    pub forest: RandomForestRegressor,
}

/// On-disk wrapper for the model file
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ModelArtifact {
    pub meta: ArtifactMeta,
    pub forest: RandomForestRegressor,
}

/// On-disk wrapper for the scaler file
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ScalerArtifact {
    pub meta: ArtifactMeta,
    pub scaler: StandardScaler,
}

/// On-disk wrapper for the schema file
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SchemaArtifact {
    pub meta: ArtifactMeta,
    pub schema: ColumnSchema,
}
