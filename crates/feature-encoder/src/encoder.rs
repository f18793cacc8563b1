//! Feature Map Assembly

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use vehicle_record::VehicleRecord;

/// Numeric passthrough columns, in encoding order
pub const NUMERIC_COLUMNS: [&str; 4] = [
    "Engine_Size",
    "Engine_Cylinders",
    "Model_Year",
    "Fuel_Capacity",
];

/// Number of hashed brand columns
pub const BRAND_HASH_DIMENSION: usize = 16;

/// Prefix of the hashed brand columns (`Car_Brand_0` .. `Car_Brand_15`)
pub const BRAND_COLUMN_PREFIX: &str = "Car_Brand_";

/// Ordered feature-name to value mapping produced by the encoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMap {
    entries: Vec<(String, f64)>,
}

impl FeatureMap {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, name: impl Into<String>, value: f64) {
        self.entries.push((name.into(), value));
    }

    /// Look up a value by column name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Number of columns produced
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no columns were produced
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (name, value) pairs in production order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Column names in production order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

/// Build an indicator column name for a categorical level
pub fn indicator_column(field: &str, level: &str) -> String {
    format!("{field}_{level}")
}

/// Hash a brand string into the fixed 16-column indicator block.
///
/// The bucket is a pure function of the string alone: the first 8 bytes of
/// its SHA-256 digest, taken big endian, modulo the block width. No process
/// seed, dataset order, or surrounding rows can change the result.
pub fn hash_brand(brand: &str) -> [f64; BRAND_HASH_DIMENSION] {
    let digest = Sha256::digest(brand.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let bucket = (u64::from_be_bytes(prefix) % BRAND_HASH_DIMENSION as u64) as usize;

    let mut columns = [0.0; BRAND_HASH_DIMENSION];
    columns[bucket] = 1.0;
    columns
}

/// Encode a vehicle record into its ordered feature map.
///
/// Production order: numeric passthrough, one indicator per categorical
/// field, then the hashed brand block. The record's own categorical level is
/// the only indicator emitted; schema alignment decides whether it survives.
pub fn encode(record: &VehicleRecord) -> FeatureMap {
    let mut features =
        FeatureMap::with_capacity(NUMERIC_COLUMNS.len() + 3 + BRAND_HASH_DIMENSION);

    features.push("Engine_Size", record.engine_size);
    features.push("Engine_Cylinders", record.engine_cylinders);
    features.push("Model_Year", record.model_year);
    features.push("Fuel_Capacity", record.fuel_capacity);

    features.push(
        indicator_column("Drive_Type", record.drive_type.as_str()),
        1.0,
    );
    features.push(indicator_column("Fuel_Type", record.fuel_type.as_str()), 1.0);
    features.push(
        indicator_column("Vehicle_Class", record.vehicle_class.as_str()),
        1.0,
    );

    for (i, value) in hash_brand(&record.car_brand).iter().enumerate() {
        features.push(format!("{BRAND_COLUMN_PREFIX}{i}"), *value);
    }

    features
}
