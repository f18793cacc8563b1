//! Raw and Typed Vehicle Records

use crate::error::RecordError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Drive type of the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriveType {
    #[serde(rename = "FWD")]
    Fwd,
    #[serde(rename = "RWD")]
    Rwd,
    #[serde(rename = "AWD")]
    Awd,
    #[serde(rename = "4WD")]
    FourWd,
}

impl DriveType {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DriveType::Fwd => "FWD",
            DriveType::Rwd => "RWD",
            DriveType::Awd => "AWD",
            DriveType::FourWd => "4WD",
        }
    }
}

impl FromStr for DriveType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            v if v.eq_ignore_ascii_case("FWD") => Ok(DriveType::Fwd),
            v if v.eq_ignore_ascii_case("RWD") => Ok(DriveType::Rwd),
            v if v.eq_ignore_ascii_case("AWD") => Ok(DriveType::Awd),
            v if v.eq_ignore_ascii_case("4WD") => Ok(DriveType::FourWd),
            _ => Err(RecordError::UnknownCategory {
                field: "Drive_Type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DriveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fuel type of the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Gasoline,
    Diesel,
    Hybrid,
    Electric,
}

impl FuelType {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Gasoline => "Gasoline",
            FuelType::Diesel => "Diesel",
            FuelType::Hybrid => "Hybrid",
            FuelType::Electric => "Electric",
        }
    }
}

impl FromStr for FuelType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            v if v.eq_ignore_ascii_case("Gasoline") => Ok(FuelType::Gasoline),
            v if v.eq_ignore_ascii_case("Diesel") => Ok(FuelType::Diesel),
            v if v.eq_ignore_ascii_case("Hybrid") => Ok(FuelType::Hybrid),
            v if v.eq_ignore_ascii_case("Electric") => Ok(FuelType::Electric),
            _ => Err(RecordError::UnknownCategory {
                field: "Fuel_Type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body class of the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleClass {
    Sedan,
    #[serde(rename = "SUV")]
    Suv,
    Truck,
    Van,
    Coupe,
    Hatchback,
    Convertible,
}

impl VehicleClass {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Sedan => "Sedan",
            VehicleClass::Suv => "SUV",
            VehicleClass::Truck => "Truck",
            VehicleClass::Van => "Van",
            VehicleClass::Coupe => "Coupe",
            VehicleClass::Hatchback => "Hatchback",
            VehicleClass::Convertible => "Convertible",
        }
    }
}

impl FromStr for VehicleClass {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            v if v.eq_ignore_ascii_case("Sedan") => Ok(VehicleClass::Sedan),
            v if v.eq_ignore_ascii_case("SUV") => Ok(VehicleClass::Suv),
            v if v.eq_ignore_ascii_case("Truck") => Ok(VehicleClass::Truck),
            v if v.eq_ignore_ascii_case("Van") => Ok(VehicleClass::Van),
            v if v.eq_ignore_ascii_case("Coupe") => Ok(VehicleClass::Coupe),
            v if v.eq_ignore_ascii_case("Hatchback") => Ok(VehicleClass::Hatchback),
            v if v.eq_ignore_ascii_case("Convertible") => Ok(VehicleClass::Convertible),
            _ => Err(RecordError::UnknownCategory {
                field: "Vehicle_Class",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allowed ranges for numeric fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRanges {
    /// Engine displacement valid range (liters)
    pub engine_size: (f64, f64),
    /// Cylinder count valid range
    pub engine_cylinders: (f64, f64),
    /// Model year valid range
    pub model_year: (f64, f64),
    /// Fuel tank capacity valid range
    pub fuel_capacity: (f64, f64),
}

impl Default for RecordRanges {
    fn default() -> Self {
        Self {
            engine_size: (0.0, 10.0),
            engine_cylinders: (0.0, 16.0),
            model_year: (1980.0, 2030.0),
            fuel_capacity: (0.0, 100_000.0),
        }
    }
}

/// A vehicle record exactly as a form submits it, all fields as strings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawVehicleRecord {
    pub engine_size: String,
    pub engine_cylinders: String,
    pub drive_type: String,
    pub fuel_type: String,
    pub vehicle_class: String,
    pub car_brand: String,
    pub model_year: String,
    pub fuel_capacity: String,
}

/// A fully parsed vehicle record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Engine displacement (liters)
    pub engine_size: f64,
    /// Cylinder count
    pub engine_cylinders: f64,
    /// Drive type
    pub drive_type: DriveType,
    /// Fuel type
    pub fuel_type: FuelType,
    /// Body class
    pub vehicle_class: VehicleClass,
    /// Brand name, free text
    pub car_brand: String,
    /// Model year
    pub model_year: f64,
    /// Fuel tank capacity
    pub fuel_capacity: f64,
}

impl RawVehicleRecord {
    /// Parse into a typed record using the default ranges
    pub fn parse(&self) -> Result<VehicleRecord, RecordError> {
        self.parse_with_ranges(&RecordRanges::default())
    }

    /// Parse into a typed record, checking numeric fields against `ranges`
    pub fn parse_with_ranges(&self, ranges: &RecordRanges) -> Result<VehicleRecord, RecordError> {
        let engine_size = parse_number("Engine_Size", &self.engine_size)?;
        let engine_cylinders = parse_number("Engine_Cylinders", &self.engine_cylinders)?;
        let model_year = parse_number("Model_Year", &self.model_year)?;
        let fuel_capacity = parse_number("Fuel_Capacity", &self.fuel_capacity)?;

        check_range("Engine_Size", engine_size, ranges.engine_size)?;
        check_range("Engine_Cylinders", engine_cylinders, ranges.engine_cylinders)?;
        check_range("Model_Year", model_year, ranges.model_year)?;
        check_range("Fuel_Capacity", fuel_capacity, ranges.fuel_capacity)?;

        let car_brand = self.car_brand.trim();
        if car_brand.is_empty() {
            return Err(RecordError::MissingField("Car_Brand"));
        }

        Ok(VehicleRecord {
            engine_size,
            engine_cylinders,
            drive_type: self.drive_type.parse()?,
            fuel_type: self.fuel_type.parse()?,
            vehicle_class: self.vehicle_class.parse()?,
            car_brand: car_brand.to_string(),
            model_year,
            fuel_capacity,
        })
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, RecordError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RecordError::MissingField(field));
    }
    let value: f64 = trimmed.parse().map_err(|_| RecordError::InvalidNumber {
        field,
        value: raw.to_string(),
    })?;
    // "NaN" and "inf" parse as f64 but are not usable attribute values
    if !value.is_finite() {
        return Err(RecordError::InvalidNumber {
            field,
            value: raw.to_string(),
        });
    }
    Ok(value)
}

fn check_range(field: &'static str, value: f64, range: (f64, f64)) -> Result<(), RecordError> {
    if value < range.0 || value > range.1 {
        Err(RecordError::OutOfRange {
            field,
            value,
            min: range.0,
            max: range.1,
        })
    } else {
        Ok(())
    }
}
