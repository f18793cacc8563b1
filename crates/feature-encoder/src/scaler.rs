//! Column Standardization

use crate::EncodeError;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Columns with a standard deviation below this are treated as constant
const STD_FLOOR: f64 = 1e-12;

/// Per-column standardization, fit once on training data.
///
/// The fitted mean and std are part of the persisted artifact bundle and are
/// applied verbatim at inference; the scaler is never refit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl StandardScaler {
    /// Compute per-column mean and population standard deviation
    pub fn fit(x: &Array2<f64>) -> Result<Self, EncodeError> {
        let n_rows = x.nrows();
        if n_rows == 0 {
            return Err(EncodeError::EmptyMatrix);
        }

        let n = n_rows as f64;
        let mut mean = Vec::with_capacity(x.ncols());
        let mut std = Vec::with_capacity(x.ncols());

        for column in x.columns() {
            let m = column.sum() / n;
            let var = column.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / n;
            mean.push(m);
            std.push(var.sqrt());
        }

        debug!("Fitted scaler over {} columns, {} rows", mean.len(), n_rows);
        Ok(Self { mean, std })
    }

    /// Standardize a full matrix
    pub fn transform_matrix(&self, x: &Array2<f64>) -> Result<Array2<f64>, EncodeError> {
        if x.ncols() != self.mean.len() {
            return Err(EncodeError::DimensionMismatch {
                expected: self.mean.len(),
                actual: x.ncols(),
            });
        }

        let mut scaled = x.clone();
        for (j, mut column) in scaled.columns_mut().into_iter().enumerate() {
            let (m, s) = (self.mean[j], self.std[j]);
            column.mapv_inplace(|v| scale_value(v, m, s));
        }
        Ok(scaled)
    }

    /// Standardize a single feature vector
    pub fn transform_row(&self, row: ArrayView1<f64>) -> Result<Array1<f64>, EncodeError> {
        if row.len() != self.mean.len() {
            return Err(EncodeError::DimensionMismatch {
                expected: self.mean.len(),
                actual: row.len(),
            });
        }

        let values: Vec<f64> = row
            .iter()
            .enumerate()
            .map(|(j, &v)| scale_value(v, self.mean[j], self.std[j]))
            .collect();
        Ok(Array1::from_vec(values))
    }

    /// Fitted per-column means
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Fitted per-column standard deviations
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Number of columns the scaler was fit on
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// True when the scaler was fit on zero columns
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

// A constant column carries no information: map it to 0 instead of dividing
// by a zero std.
fn scale_value(value: f64, mean: f64, std: f64) -> f64 {
    if std <= STD_FLOOR {
        0.0
    } else {
        (value - mean) / std
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_transform_standardizes_columns() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        let scaled = scaler.transform_matrix(&x).unwrap();

        for j in 0..2 {
            let column = scaled.column(j);
            let mean = column.sum() / 4.0;
            let var = column.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / 4.0;
            assert!(mean.abs() < 1e-10, "column {j} mean {mean}");
            assert!((var.sqrt() - 1.0).abs() < 1e-10, "column {j} std");
        }
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let x = array![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        let scaled = scaler.transform_matrix(&x).unwrap();

        for i in 0..3 {
            assert_eq!(scaled[[i, 0]], 0.0);
        }
    }

    #[test]
    fn test_row_transform_matches_matrix_transform() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        let scaled = scaler.transform_matrix(&x).unwrap();

        for i in 0..3 {
            let row = scaler.transform_row(x.row(i)).unwrap();
            for j in 0..2 {
                assert_eq!(row[j], scaled[[i, j]]);
            }
        }
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let x = Array2::<f64>::zeros((0, 3));
        assert_eq!(StandardScaler::fit(&x), Err(EncodeError::EmptyMatrix));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        let narrow = array![[1.0], [2.0]];
        assert!(matches!(
            scaler.transform_matrix(&narrow),
            Err(EncodeError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }
}
