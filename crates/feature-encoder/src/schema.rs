//! Column Schema and Alignment

use crate::encoder::{indicator_column, FeatureMap, BRAND_COLUMN_PREFIX, BRAND_HASH_DIMENSION, NUMERIC_COLUMNS};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Categorical fields that expand into one-hot indicators, in column order
pub const CATEGORICAL_FIELDS: [&str; 3] = ["Drive_Type", "Fuel_Type", "Vehicle_Class"];

/// The ordered list of feature columns a trained model expects.
///
/// Captured once at training time and persisted with the model; alignment
/// against it is what keeps inference vectors compatible with the training
/// feature set. Also records the categorical levels observed in training so
/// inference can tell an unseen level from a dropped reference level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    columns: Vec<String>,
    categorical_levels: BTreeMap<String, Vec<String>>,
}

impl ColumnSchema {
    /// Build the training-time schema from the categorical levels observed
    /// in the dataset.
    ///
    /// Indicator columns are emitted for every observed level except the
    /// alphabetically first one per field, which becomes the dropped
    /// reference level. Pinning the reference alphabetically keeps the
    /// schema independent of dataset row order.
    pub fn from_observed_levels(observed: &BTreeMap<String, BTreeSet<String>>) -> Self {
        let mut columns: Vec<String> = NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut categorical_levels = BTreeMap::new();

        for field in CATEGORICAL_FIELDS {
            let levels: Vec<String> = observed
                .get(field)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();
            // BTreeSet iteration is already sorted; skip the reference level
            for level in levels.iter().skip(1) {
                columns.push(indicator_column(field, level));
            }
            categorical_levels.insert(field.to_string(), levels);
        }

        for i in 0..BRAND_HASH_DIMENSION {
            columns.push(format!("{BRAND_COLUMN_PREFIX}{i}"));
        }

        Self {
            columns,
            categorical_levels,
        }
    }

    /// Ordered column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether a column name is part of the schema
    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Levels observed at training time for a categorical field
    pub fn observed_levels(&self, field: &str) -> Option<&[String]> {
        self.categorical_levels.get(field).map(|v| v.as_slice())
    }

    /// Whether a categorical level was observed at training time
    pub fn is_observed(&self, field: &str, level: &str) -> bool {
        self.categorical_levels
            .get(field)
            .is_some_and(|levels| levels.iter().any(|l| l == level))
    }
}

/// Project a feature map onto the schema's column order.
///
/// For each schema column, in schema order, takes the map's value or 0.0.
/// Map keys absent from the schema are dropped silently; this is the
/// compatibility boundary that lets inference tolerate categorical levels
/// the training data never produced.
pub fn align(features: &FeatureMap, schema: &ColumnSchema) -> Array1<f64> {
    let values: Vec<f64> = schema
        .columns()
        .iter()
        .map(|column| features.get(column).unwrap_or(0.0))
        .collect();
    Array1::from_vec(values)
}
