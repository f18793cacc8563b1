//! Regression Metrics

use ndarray::Array1;

/// R² coefficient of determination.
///
/// Returns 0.0 when the target has no variance or the inputs are empty.
pub fn r_squared(actual: &Array1<f64>, predicted: &Array1<f64>) -> f64 {
    if actual.is_empty() || actual.len() != predicted.len() {
        return 0.0;
    }

    let mean = actual.sum() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|v| (v - mean) * (v - mean)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }

    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_perfect_prediction_scores_one() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(r_squared(&y, &y.clone()), 1.0);
    }

    #[test]
    fn test_mean_prediction_scores_zero() {
        let actual = array![1.0, 2.0, 3.0];
        let predicted = array![2.0, 2.0, 2.0];
        assert_eq!(r_squared(&actual, &predicted), 0.0);
    }

    #[test]
    fn test_constant_target_scores_zero() {
        let actual = array![5.0, 5.0, 5.0];
        let predicted = array![4.0, 5.0, 6.0];
        assert_eq!(r_squared(&actual, &predicted), 0.0);
    }

    #[test]
    fn test_worse_than_mean_is_negative() {
        let actual = array![1.0, 2.0, 3.0];
        let predicted = array![3.0, 2.0, 1.0];
        assert!(r_squared(&actual, &predicted) < 0.0);
    }
}
