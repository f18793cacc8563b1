//! Training Pipeline Orchestration

use crate::{dataset, TrainingError};
use artifact_store::{ArtifactMeta, ArtifactStore, ModelBundle};
use feature_encoder::{align, encode, ColumnSchema, StandardScaler, CATEGORICAL_FIELDS};
use ndarray::{Array1, Array2};
use outlier_filter::{retain_inliers, IsolationForestConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regressor::{r_squared, ForestConfig, RandomForestRegressor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::info;
use vehicle_record::VehicleRecord;

/// Training run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// CSV dataset to train on
    pub dataset_path: PathBuf,
    /// Directory the artifact bundle is written to
    pub artifact_dir: PathBuf,
    /// Fraction of rows held out for evaluation
    pub test_fraction: f64,
    /// Seed for the train/test shuffle
    pub split_seed: u64,
    /// Outlier filter settings
    pub outlier: IsolationForestConfig,
    /// Forest hyperparameters
    pub forest: ForestConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("vehicles_dataset.csv"),
            artifact_dir: PathBuf::from("artifacts"),
            test_fraction: 0.2,
            split_seed: 42,
            outlier: IsolationForestConfig::default(),
            forest: ForestConfig::default(),
        }
    }
}

/// Summary of a completed training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    /// Identity of the saved bundle
    pub meta: ArtifactMeta,
    /// Dataset rows before filtering
    pub n_rows: usize,
    /// Rows removed by the outlier filter
    pub n_outliers: usize,
    /// Rows used for fitting
    pub n_train: usize,
    /// Rows held out for evaluation
    pub n_test: usize,
    /// R² on the held-out rows
    pub r_squared: f64,
}

/// Offline training: one run produces one coupled artifact bundle
pub struct TrainingPipeline;

impl TrainingPipeline {
    /// Run the full pipeline and persist the bundle.
    ///
    /// Any failure aborts the run before anything is written; artifacts are
    /// only saved once fitting and evaluation have succeeded.
    pub fn run(config: &TrainingConfig) -> Result<TrainingReport, TrainingError> {
        info!("Loading dataset from {}", config.dataset_path.display());
        let records = dataset::load_dataset(&config.dataset_path)?;
        let n_rows = records.len();

        let schema = build_schema(&records);
        info!("Column schema captured: {} feature columns", schema.len());

        // The filter scores the full encoded matrix, target column
        // included; the target is split off only after filtering
        let full = encode_with_target(&records, &schema)?;
        let keep = retain_inliers(&full, &config.outlier)?;
        let n_outliers = n_rows - keep.len();
        if keep.is_empty() {
            return Err(TrainingError::EmptyAfterFilter);
        }
        info!("Outlier filter removed {} of {} rows", n_outliers, n_rows);

        let n_features = schema.len();
        let (features, target) = split_target(&full, &keep, n_features)?;

        let (train_idx, test_idx) =
            shuffle_split(keep.len(), config.test_fraction, config.split_seed)?;
        let x_train = select_rows(&features, &train_idx)?;
        let x_test = select_rows(&features, &test_idx)?;
        let y_train = Array1::from_vec(train_idx.iter().map(|&i| target[i]).collect());
        let y_test = Array1::from_vec(test_idx.iter().map(|&i| target[i]).collect());

        // Fit on the training partition only; the held-out rows see the
        // same frozen state inference will
        let scaler = StandardScaler::fit(&x_train)?;
        let x_train_scaled = scaler.transform_matrix(&x_train)?;
        let x_test_scaled = scaler.transform_matrix(&x_test)?;

        info!(
            "Training forest: {} trees on {} rows",
            config.forest.n_estimators,
            x_train_scaled.nrows()
        );
        let mut forest = RandomForestRegressor::new(config.forest.clone());
        forest.fit(&x_train_scaled, &y_train)?;

        let predicted = forest.predict_matrix(&x_test_scaled)?;
        let score = r_squared(&y_test, &predicted);
        info!("Model R² score: {:.4}", score);

        let meta = ArtifactMeta::new();
        let bundle = ModelBundle {
            meta: meta.clone(),
            schema,
            scaler,
            forest,
        };
        ArtifactStore::new(&config.artifact_dir).save(&bundle)?;

        Ok(TrainingReport {
            meta,
            n_rows,
            n_outliers,
            n_train: train_idx.len(),
            n_test: test_idx.len(),
            r_squared: score,
        })
    }
}

/// Collect the categorical levels observed in the dataset and freeze them
/// into the column schema
fn build_schema(records: &[(VehicleRecord, f64)]) -> ColumnSchema {
    let mut observed: BTreeMap<String, BTreeSet<String>> = CATEGORICAL_FIELDS
        .iter()
        .map(|field| (field.to_string(), BTreeSet::new()))
        .collect();

    for (record, _) in records {
        for (field, level) in [
            ("Drive_Type", record.drive_type.as_str()),
            ("Fuel_Type", record.fuel_type.as_str()),
            ("Vehicle_Class", record.vehicle_class.as_str()),
        ] {
            if let Some(levels) = observed.get_mut(field) {
                levels.insert(level.to_string());
            }
        }
    }

    ColumnSchema::from_observed_levels(&observed)
}

/// Encode every record, align it to the schema, and append the target as
/// the last column
fn encode_with_target(
    records: &[(VehicleRecord, f64)],
    schema: &ColumnSchema,
) -> Result<Array2<f64>, TrainingError> {
    let width = schema.len() + 1;
    let mut data = Vec::with_capacity(records.len() * width);
    for (record, mpg) in records {
        data.extend(align(&encode(record), schema).iter());
        data.push(*mpg);
    }
    Array2::from_shape_vec((records.len(), width), data).map_err(|_| TrainingError::Shape)
}

/// Separate the retained rows into a feature matrix and target vector
fn split_target(
    full: &Array2<f64>,
    keep: &[usize],
    n_features: usize,
) -> Result<(Array2<f64>, Vec<f64>), TrainingError> {
    let mut data = Vec::with_capacity(keep.len() * n_features);
    let mut target = Vec::with_capacity(keep.len());
    for &i in keep {
        let row = full.row(i);
        data.extend(row.iter().take(n_features));
        target.push(row[n_features]);
    }
    let features = Array2::from_shape_vec((keep.len(), n_features), data)
        .map_err(|_| TrainingError::Shape)?;
    Ok((features, target))
}

/// Seeded shuffle split into train and test index sets
fn shuffle_split(
    n: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), TrainingError> {
    if n < 2 {
        return Err(TrainingError::InsufficientRows(n));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * test_fraction).round() as usize;
    let n_test = n_test.clamp(1, n - 1);
    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    Ok((train, test))
}

fn select_rows(x: &Array2<f64>, indices: &[usize]) -> Result<Array2<f64>, TrainingError> {
    let mut data = Vec::with_capacity(indices.len() * x.ncols());
    for &i in indices {
        data.extend(x.row(i).iter());
    }
    Array2::from_shape_vec((indices.len(), x.ncols()), data).map_err(|_| TrainingError::Shape)
}
