//! Vehicle Dataset Loading and Imputation

use crate::TrainingError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};
use vehicle_record::{DriveType, FuelType, VehicleClass, VehicleRecord};

/// One row of the vehicle CSV dataset.
///
/// `Engine_Size`, `Engine_Cylinders`, and `Drive_Type` may be blank in the
/// source data and are imputed before training; every other column is
/// required. The legacy `Vehicle Class/Type` header survives only here.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetRow {
    #[serde(rename = "Engine_Size")]
    pub engine_size: Option<f64>,
    #[serde(rename = "Engine_Cylinders")]
    pub engine_cylinders: Option<f64>,
    #[serde(rename = "Drive_Type")]
    pub drive_type: Option<DriveType>,
    #[serde(rename = "Fuel_Type")]
    pub fuel_type: FuelType,
    #[serde(rename = "Vehicle Class/Type")]
    pub vehicle_class: VehicleClass,
    #[serde(rename = "Car_Brand")]
    pub car_brand: String,
    #[serde(rename = "Model_Year")]
    pub model_year: f64,
    #[serde(rename = "Fuel_Capacity")]
    pub fuel_capacity: f64,
    #[serde(rename = "Combined_MPG")]
    pub combined_mpg: f64,
}

/// Load the dataset and impute missing values, returning typed records
/// paired with their MPG target
pub fn load_dataset(path: &Path) -> Result<Vec<(VehicleRecord, f64)>, TrainingError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: DatasetRow = result?;
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(TrainingError::EmptyDataset);
    }
    info!("Dataset loaded: {} rows", rows.len());

    impute_missing(&mut rows)?;
    into_records(rows)
}

/// Fill the columns the source data leaves blank: numeric columns with the
/// column mean, drive type with the column mode
fn impute_missing(rows: &mut [DatasetRow]) -> Result<(), TrainingError> {
    let engine_size_mean = mean_of(rows.iter().filter_map(|r| r.engine_size))
        .ok_or(TrainingError::EmptyColumn("Engine_Size"))?;
    let cylinders_mean = mean_of(rows.iter().filter_map(|r| r.engine_cylinders))
        .ok_or(TrainingError::EmptyColumn("Engine_Cylinders"))?;
    let drive_mode = mode_of(rows.iter().filter_map(|r| r.drive_type))
        .ok_or(TrainingError::EmptyColumn("Drive_Type"))?;

    let mut filled = 0usize;
    for row in rows.iter_mut() {
        if row.engine_size.is_none() {
            row.engine_size = Some(engine_size_mean);
            filled += 1;
        }
        if row.engine_cylinders.is_none() {
            row.engine_cylinders = Some(cylinders_mean);
            filled += 1;
        }
        if row.drive_type.is_none() {
            row.drive_type = Some(drive_mode);
            filled += 1;
        }
    }
    debug!("Imputed {} missing values", filled);
    Ok(())
}

fn into_records(rows: Vec<DatasetRow>) -> Result<Vec<(VehicleRecord, f64)>, TrainingError> {
    rows.into_iter()
        .map(|row| {
            let record = VehicleRecord {
                engine_size: row.engine_size.ok_or(TrainingError::EmptyColumn("Engine_Size"))?,
                engine_cylinders: row
                    .engine_cylinders
                    .ok_or(TrainingError::EmptyColumn("Engine_Cylinders"))?,
                drive_type: row.drive_type.ok_or(TrainingError::EmptyColumn("Drive_Type"))?,
                fuel_type: row.fuel_type,
                vehicle_class: row.vehicle_class,
                car_brand: row.car_brand,
                model_year: row.model_year,
                fuel_capacity: row.fuel_capacity,
            };
            Ok((record, row.combined_mpg))
        })
        .collect()
}

fn mean_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Most frequent value; ties resolve to the first in sort order, keeping
/// imputation independent of row order
fn mode_of(values: impl Iterator<Item = DriveType>) -> Option<DriveType> {
    let mut counts: BTreeMap<&'static str, (usize, DriveType)> = BTreeMap::new();
    for value in values {
        counts.entry(value.as_str()).or_insert((0, value)).0 += 1;
    }

    let mut best: Option<(usize, DriveType)> = None;
    for (count, value) in counts.into_values() {
        if best.map_or(true, |(top, _)| count > top) {
            best = Some((count, value));
        }
    }
    best.map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Engine_Size,Engine_Cylinders,Drive_Type,Fuel_Type,Vehicle Class/Type,Car_Brand,Model_Year,Fuel_Capacity,Combined_MPG";

    fn write_csv(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_load_complete_rows() {
        let file = write_csv(&[
            "2.0,4,FWD,Gasoline,Sedan,Toyota,2020,50,32.5",
            "5.7,8,RWD,Gasoline,Truck,Ford,2019,98,17.0",
        ]);

        let records = load_dataset(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0.drive_type, DriveType::Fwd);
        assert_eq!(records[1].1, 17.0);
    }

    #[test]
    fn test_missing_values_imputed() {
        let file = write_csv(&[
            "2.0,4,FWD,Gasoline,Sedan,Toyota,2020,50,32.5",
            "4.0,8,FWD,Gasoline,Truck,Ford,2019,98,17.0",
            ",,RWD,Diesel,Van,Ram,2021,110,21.0",
            "3.0,6,,Hybrid,SUV,Kia,2022,60,28.0",
        ]);

        let records = load_dataset(file.path()).unwrap();
        // Mean of the present values: (2.0 + 4.0 + 3.0) / 3
        assert_eq!(records[2].0.engine_size, 3.0);
        assert_eq!(records[2].0.engine_cylinders, 6.0);
        // FWD is the mode
        assert_eq!(records[3].0.drive_type, DriveType::Fwd);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let file = write_csv(&[]);
        assert!(matches!(
            load_dataset(file.path()),
            Err(TrainingError::EmptyDataset)
        ));
    }

    #[test]
    fn test_unknown_category_is_fatal() {
        let file = write_csv(&["2.0,4,9WD,Gasoline,Sedan,Toyota,2020,50,32.5"]);
        assert!(matches!(
            load_dataset(file.path()),
            Err(TrainingError::Dataset(_))
        ));
    }

    #[test]
    fn test_all_missing_column_is_fatal() {
        let file = write_csv(&[
            ",4,FWD,Gasoline,Sedan,Toyota,2020,50,32.5",
            ",8,RWD,Gasoline,Truck,Ford,2019,98,17.0",
        ]);
        assert!(matches!(
            load_dataset(file.path()),
            Err(TrainingError::EmptyColumn("Engine_Size"))
        ));
    }

    #[test]
    fn test_mode_tie_breaks_by_sort_order() {
        let values = [DriveType::Rwd, DriveType::FourWd];
        // One of each: "4WD" sorts before "RWD"
        assert_eq!(mode_of(values.into_iter()), Some(DriveType::FourWd));
    }
}
