//! Vehicle Record Types
//!
//! Parses raw form-supplied vehicle attributes into a typed record.

mod error;
mod record;

pub use error::RecordError;
pub use record::{
    DriveType, FuelType, RawVehicleRecord, RecordRanges, VehicleClass, VehicleRecord,
};
