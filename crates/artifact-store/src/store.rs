//! Bundle Persistence

use crate::bundle::{
    ModelArtifact, ModelBundle, ScalerArtifact, SchemaArtifact, COLUMNS_FILE, MODEL_FILE,
    SCALER_FILE,
};
use crate::ArtifactError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Filesystem store for the three-artifact bundle
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the artifacts live in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether all three artifact files are present
    pub fn exists(&self) -> bool {
        [MODEL_FILE, SCALER_FILE, COLUMNS_FILE]
            .iter()
            .all(|name| self.dir.join(name).exists())
    }

    /// Write the bundle all-or-nothing.
    ///
    /// Every artifact is serialized and written to a temp file first; the
    /// renames into place happen only after all writes succeeded, so a
    /// failed save never leaves a partial bundle behind and a concurrent
    /// reader never observes a half-written file.
    pub fn save(&self, bundle: &ModelBundle) -> Result<(), ArtifactError> {
        fs::create_dir_all(&self.dir)?;

        let model = postcard::to_allocvec(&ModelArtifact {
            meta: bundle.meta.clone(),
            forest: bundle.forest.clone(),
        })
        .map_err(|e| ArtifactError::Encode(e.to_string()))?;
        let scaler = serde_json::to_vec_pretty(&ScalerArtifact {
            meta: bundle.meta.clone(),
            scaler: bundle.scaler.clone(),
        })
        .map_err(|e| ArtifactError::Encode(e.to_string()))?;
        let schema = serde_json::to_vec_pretty(&SchemaArtifact {
            meta: bundle.meta.clone(),
            schema: bundle.schema.clone(),
        })
        .map_err(|e| ArtifactError::Encode(e.to_string()))?;

        let staged = [
            (MODEL_FILE, model),
            (SCALER_FILE, scaler),
            (COLUMNS_FILE, schema),
        ];

        let mut written = Vec::with_capacity(staged.len());
        for (name, bytes) in &staged {
            let tmp = self.dir.join(format!("{name}.tmp"));
            if let Err(e) = fs::write(&tmp, bytes) {
                for path in &written {
                    let _ = fs::remove_file(path);
                }
                return Err(e.into());
            }
            written.push(tmp);
        }

        for (name, _) in &staged {
            fs::rename(
                self.dir.join(format!("{name}.tmp")),
                self.dir.join(name),
            )?;
        }

        info!(
            "Saved artifact bundle {} to {}",
            bundle.meta.bundle_id,
            self.dir.display()
        );
        Ok(())
    }

    /// Load and recouple the three artifacts.
    ///
    /// Fails with `Missing` when any file is absent and `BundleMismatch`
    /// when the files come from different training runs.
    pub fn load(&self) -> Result<ModelBundle, ArtifactError> {
        let model: ModelArtifact = postcard::from_bytes(&self.read(MODEL_FILE)?)
            .map_err(|e| ArtifactError::Decode(format!("{MODEL_FILE}: {e}")))?;
        let scaler: ScalerArtifact = serde_json::from_slice(&self.read(SCALER_FILE)?)
            .map_err(|e| ArtifactError::Decode(format!("{SCALER_FILE}: {e}")))?;
        let schema: SchemaArtifact = serde_json::from_slice(&self.read(COLUMNS_FILE)?)
            .map_err(|e| ArtifactError::Decode(format!("{COLUMNS_FILE}: {e}")))?;

        if model.meta.bundle_id != scaler.meta.bundle_id
            || model.meta.bundle_id != schema.meta.bundle_id
        {
            return Err(ArtifactError::BundleMismatch(format!(
                "model {}, scaler {}, schema {}",
                model.meta.bundle_id, scaler.meta.bundle_id, schema.meta.bundle_id
            )));
        }

        debug!("Loaded artifact bundle {}", model.meta.bundle_id);
        Ok(ModelBundle {
            meta: model.meta,
            schema: schema.schema,
            scaler: scaler.scaler,
            forest: model.forest,
        })
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, ArtifactError> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Err(ArtifactError::Missing(path));
        }
        Ok(fs::read(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArtifactMeta;
    use feature_encoder::{align, encode, ColumnSchema, StandardScaler};
    use ndarray::{Array1, Array2};
    use regressor::{ForestConfig, RandomForestRegressor};
    use std::collections::{BTreeMap, BTreeSet};
    use vehicle_record::{DriveType, FuelType, VehicleClass, VehicleRecord};

    fn sample_record(i: usize) -> VehicleRecord {
        VehicleRecord {
            engine_size: 1.5 + (i % 4) as f64,
            engine_cylinders: 4.0 + (i % 3) as f64 * 2.0,
            drive_type: if i % 2 == 0 { DriveType::Fwd } else { DriveType::Awd },
            fuel_type: if i % 3 == 0 { FuelType::Diesel } else { FuelType::Gasoline },
            vehicle_class: if i % 2 == 0 { VehicleClass::Sedan } else { VehicleClass::Suv },
            car_brand: if i % 2 == 0 { "Toyota" } else { "Ford" }.to_string(),
            model_year: 2015.0 + (i % 8) as f64,
            fuel_capacity: 40.0 + i as f64,
        }
    }

    fn trained_bundle() -> ModelBundle {
        let records: Vec<VehicleRecord> = (0..24).map(sample_record).collect();

        let mut observed: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for record in &records {
            observed
                .entry("Drive_Type".to_string())
                .or_default()
                .insert(record.drive_type.as_str().to_string());
            observed
                .entry("Fuel_Type".to_string())
                .or_default()
                .insert(record.fuel_type.as_str().to_string());
            observed
                .entry("Vehicle_Class".to_string())
                .or_default()
                .insert(record.vehicle_class.as_str().to_string());
        }
        let schema = ColumnSchema::from_observed_levels(&observed);

        let rows: Vec<f64> = records
            .iter()
            .flat_map(|r| align(&encode(r), &schema).to_vec())
            .collect();
        let x = Array2::from_shape_vec((records.len(), schema.len()), rows).unwrap();
        let y = Array1::from_vec(
            records
                .iter()
                .map(|r| 45.0 - 4.0 * r.engine_size)
                .collect(),
        );

        let scaler = StandardScaler::fit(&x).unwrap();
        let x_scaled = scaler.transform_matrix(&x).unwrap();
        let mut forest = RandomForestRegressor::new(ForestConfig {
            n_estimators: 10,
            min_samples_split: 2,
            ..Default::default()
        });
        forest.fit(&x_scaled, &y).unwrap();

        ModelBundle {
            meta: ArtifactMeta::new(),
            schema,
            scaler,
            forest,
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let bundle = trained_bundle();

        store.save(&bundle).unwrap();
        assert!(store.exists());
        let loaded = store.load().unwrap();

        assert_eq!(loaded.meta, bundle.meta);
        assert_eq!(loaded.schema, bundle.schema);
        assert_eq!(loaded.scaler, bundle.scaler);

        // The reloaded forest predicts identically
        let record = sample_record(3);
        let aligned = align(&encode(&record), &bundle.schema);
        let scaled = bundle.scaler.transform_row(aligned.view()).unwrap();
        let before = bundle.forest.predict_row(scaled.view()).unwrap();
        let after = loaded.forest.predict_row(scaled.view()).unwrap();
        assert_eq!(before.to_bits(), after.to_bits());
    }

    #[test]
    fn test_missing_artifact_detected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let bundle = trained_bundle();
        store.save(&bundle).unwrap();

        std::fs::remove_file(dir.path().join(SCALER_FILE)).unwrap();
        assert!(!store.exists());
        assert!(matches!(store.load(), Err(ArtifactError::Missing(_))));
    }

    #[test]
    fn test_mixed_bundles_rejected() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let store_a = ArtifactStore::new(dir_a.path());
        let store_b = ArtifactStore::new(dir_b.path());

        store_a.save(&trained_bundle()).unwrap();
        store_b.save(&trained_bundle()).unwrap();

        // Graft one artifact from a foreign training run
        std::fs::copy(
            dir_b.path().join(SCALER_FILE),
            dir_a.path().join(SCALER_FILE),
        )
        .unwrap();

        assert!(matches!(
            store_a.load(),
            Err(ArtifactError::BundleMismatch(_))
        ));
    }

    #[test]
    fn test_save_overwrites_previous_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let first = trained_bundle();
        let second = trained_bundle();
        store.save(&first).unwrap();
        store.save(&second).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.meta.bundle_id, second.meta.bundle_id);
    }
}
