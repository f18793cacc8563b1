//! MPG Interpretation

use serde::{Deserialize, Serialize};

/// Fuel-efficiency category for a predicted MPG value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MpgCategory {
    Poor,
    Moderate,
    Good,
    Excellent,
}

impl MpgCategory {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MpgCategory::Poor => "Poor",
            MpgCategory::Moderate => "Moderate",
            MpgCategory::Good => "Good",
            MpgCategory::Excellent => "Excellent",
        }
    }

    /// Get user-facing description
    pub fn description(&self) -> &'static str {
        match self {
            MpgCategory::Poor => {
                "Poor fuel efficiency - typical for larger vehicles, trucks, and performance cars"
            }
            MpgCategory::Moderate => {
                "Moderate fuel efficiency - common for midsize sedans and smaller SUVs"
            }
            MpgCategory::Good => {
                "Good fuel efficiency - typical for compact cars and efficient sedans"
            }
            MpgCategory::Excellent => {
                "Excellent fuel efficiency - common for hybrids, electric vehicles, and very efficient compact cars"
            }
        }
    }
}

/// Bucket an MPG value into its category.
///
/// Lower bounds are inclusive; every finite value lands in exactly one
/// bucket.
pub fn interpret(mpg: f64) -> MpgCategory {
    if mpg < 20.0 {
        MpgCategory::Poor
    } else if mpg < 30.0 {
        MpgCategory::Moderate
    } else if mpg < 40.0 {
        MpgCategory::Good
    } else {
        MpgCategory::Excellent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(interpret(19.9), MpgCategory::Poor);
        assert_eq!(interpret(20.0), MpgCategory::Moderate);
        assert_eq!(interpret(29.999), MpgCategory::Moderate);
        assert_eq!(interpret(30.0), MpgCategory::Good);
        assert_eq!(interpret(39.999), MpgCategory::Good);
        assert_eq!(interpret(40.0), MpgCategory::Excellent);
    }

    #[test]
    fn test_extremes_covered() {
        assert_eq!(interpret(0.0), MpgCategory::Poor);
        assert_eq!(interpret(-5.0), MpgCategory::Poor);
        assert_eq!(interpret(150.0), MpgCategory::Excellent);
    }

    #[test]
    fn test_labels() {
        assert_eq!(MpgCategory::Poor.as_str(), "Poor");
        assert_eq!(MpgCategory::Excellent.as_str(), "Excellent");
        assert!(MpgCategory::Moderate.description().contains("midsize sedans"));
    }
}
