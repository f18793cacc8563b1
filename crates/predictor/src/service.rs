//! Prediction Service

use crate::interpret::{interpret, MpgCategory};
use crate::PredictError;
use artifact_store::{ArtifactError, ArtifactStore, ModelBundle};
use feature_encoder::{align, encode, BRAND_COLUMN_PREFIX, BRAND_HASH_DIMENSION, NUMERIC_COLUMNS};
use serde::Serialize;
use tracing::{debug, info, warn};
use trainer::{TrainingConfig, TrainingPipeline};
use vehicle_record::{RawVehicleRecord, VehicleRecord};

/// Result of a single prediction
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    /// Predicted combined MPG
    pub mpg: f64,
    /// Threshold bucket for the value
    pub category: MpgCategory,
    /// Set when a categorical level was never seen at training time; the
    /// prediction leaned on zeroed indicators and deserves less trust
    pub degraded: bool,
}

impl Prediction {
    /// Display value, one decimal place
    pub fn rounded_mpg(&self) -> f64 {
        (self.mpg * 10.0).round() / 10.0
    }
}

/// Prediction service over an immutable artifact bundle.
///
/// The bundle is loaded once and never mutated; the service can be shared
/// read-only across threads without locking.
pub struct MpgPredictor {
    bundle: ModelBundle,
}

impl MpgPredictor {
    /// Wrap a loaded bundle, verifying its schema covers the encoder's
    /// deterministic columns
    pub fn new(bundle: ModelBundle) -> Result<Self, PredictError> {
        for column in NUMERIC_COLUMNS {
            if !bundle.schema.contains(column) {
                return Err(PredictError::SchemaMismatch(column.to_string()));
            }
        }
        for i in 0..BRAND_HASH_DIMENSION {
            let column = format!("{BRAND_COLUMN_PREFIX}{i}");
            if !bundle.schema.contains(&column) {
                return Err(PredictError::SchemaMismatch(column));
            }
        }

        debug!("Predictor ready with bundle {}", bundle.meta.bundle_id);
        Ok(Self { bundle })
    }

    /// Load the bundle from `config.artifact_dir`, running the training
    /// pipeline first when the bundle is absent.
    ///
    /// Only a missing bundle triggers training; a corrupt or mixed bundle
    /// is surfaced as an error instead of silently retrained over.
    pub fn load_or_train(config: &TrainingConfig) -> Result<Self, PredictError> {
        let store = ArtifactStore::new(&config.artifact_dir);
        let bundle = match store.load() {
            Ok(bundle) => bundle,
            Err(ArtifactError::Missing(path)) => {
                info!(
                    "Artifact {} not found, running training pipeline",
                    path.display()
                );
                TrainingPipeline::run(config)?;
                store.load()?
            }
            Err(e) => return Err(e.into()),
        };
        Self::new(bundle)
    }

    /// The bundle backing this service
    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Predict MPG for a raw form submission
    pub fn predict(&self, raw: &RawVehicleRecord) -> Result<Prediction, PredictError> {
        let record = raw.parse()?;
        self.predict_record(&record)
    }

    /// Predict MPG for an already-parsed record
    pub fn predict_record(&self, record: &VehicleRecord) -> Result<Prediction, PredictError> {
        let degraded = self.check_level_coverage(record);

        let aligned = align(&encode(record), &self.bundle.schema);
        let scaled = self.bundle.scaler.transform_row(aligned.view())?;
        let mpg = self.bundle.forest.predict_row(scaled.view())?;

        Ok(Prediction {
            mpg,
            category: interpret(mpg),
            degraded,
        })
    }

    /// Warn about categorical levels the training data never contained.
    /// Their indicators align to all zeros, which is tolerated but worth
    /// flagging to the caller.
    fn check_level_coverage(&self, record: &VehicleRecord) -> bool {
        let mut degraded = false;
        for (field, level) in [
            ("Drive_Type", record.drive_type.as_str()),
            ("Fuel_Type", record.fuel_type.as_str()),
            ("Vehicle_Class", record.vehicle_class.as_str()),
        ] {
            if !self.bundle.schema.is_observed(field, level) {
                warn!("{field} level {level:?} was not in the training data; prediction degraded");
                degraded = true;
            }
        }
        degraded
    }
}
