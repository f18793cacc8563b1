//! Bootstrap Ensemble

use crate::tree::RegressionTree;
use crate::ModelError;
use ndarray::{Array1, Array2, ArrayView1};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the ensemble
    pub n_estimators: usize,
    /// Maximum tree depth; None grows trees until the leaves are pure
    pub max_depth: Option<usize>,
    /// Minimum samples required to split an internal node
    pub min_samples_split: usize,
    /// Minimum samples required at a leaf
    pub min_samples_leaf: usize,
    /// Seed for bootstrap sampling
    pub random_state: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 300,
            max_depth: None,
            min_samples_split: 10,
            min_samples_leaf: 1,
            random_state: 42,
        }
    }
}

/// Random forest regressor.
///
/// Each tree trains on a seeded bootstrap sample; prediction averages the
/// trees. Inference has no randomness: repeated calls on the same state and
/// input are bit-identical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    /// Create an unfitted forest
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
        }
    }

    /// Fit the ensemble on training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(ModelError::SampleMismatch {
                x_rows: n_samples,
                y_len: y.len(),
            });
        }
        if n_samples == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }

        let targets: Vec<f64> = y.iter().copied().collect();
        self.trees = Vec::with_capacity(self.config.n_estimators);

        for i in 0..self.config.n_estimators {
            let seed = self.config.random_state.wrapping_add(i as u64);
            let indices = bootstrap_sample(n_samples, seed);

            let mut tree = RegressionTree::new(
                self.config.max_depth,
                self.config.min_samples_split,
                self.config.min_samples_leaf,
            );
            tree.fit_on_indices(x, &targets, indices)?;
            self.trees.push(tree);
        }

        debug!("Fitted random forest: {} trees", self.trees.len());
        Ok(())
    }

    /// Predict a single row by averaging the trees
    pub fn predict_row(&self, row: ArrayView1<f64>) -> Result<f64, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.predict_row(row)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    /// Predict every row of a matrix
    pub fn predict_matrix(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let mut predictions = Vec::with_capacity(x.nrows());
        for row in x.rows() {
            predictions.push(self.predict_row(row)?);
        }
        Ok(Array1::from_vec(predictions))
    }

    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// The hyperparameters the forest was built with
    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

/// Seeded bootstrap sample: n indices drawn with replacement
fn bootstrap_sample(n_samples: usize, seed: u64) -> Vec<usize> {
    let dist = Uniform::from(0..n_samples);
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n_samples).map(|_| dist.sample(&mut rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};

    fn linear_data(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec(
            (n, 2),
            (0..n).flat_map(|i| [i as f64, (n - i) as f64]).collect(),
        )
        .unwrap();
        let y = Array1::from_vec((0..n).map(|i| 3.0 * i as f64 + 1.0).collect());
        (x, y)
    }

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_estimators: 20,
            min_samples_split: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_fit_and_predict() {
        let (x, y) = linear_data(30);
        let mut forest = RandomForestRegressor::new(small_config());
        forest.fit(&x, &y).unwrap();

        assert_eq!(forest.n_trees(), 20);
        let prediction = forest.predict_row(x.row(10)).unwrap();
        assert!((prediction - y[10]).abs() < 10.0);
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let (x, y) = linear_data(30);
        let mut forest = RandomForestRegressor::new(small_config());
        forest.fit(&x, &y).unwrap();

        let row = array![12.0, 18.0];
        let first = forest.predict_row(row.view()).unwrap();
        let second = forest.predict_row(row.view()).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn test_refit_with_same_seed_is_identical() {
        let (x, y) = linear_data(30);
        let mut first = RandomForestRegressor::new(small_config());
        let mut second = RandomForestRegressor::new(small_config());
        first.fit(&x, &y).unwrap();
        second.fit(&x, &y).unwrap();

        let row = array![7.0, 23.0];
        assert_eq!(
            first.predict_row(row.view()).unwrap().to_bits(),
            second.predict_row(row.view()).unwrap().to_bits()
        );
    }

    #[test]
    fn test_unfitted_forest_rejected() {
        let forest = RandomForestRegressor::new(small_config());
        assert_eq!(
            forest.predict_row(array![1.0, 2.0].view()),
            Err(ModelError::NotFitted)
        );
    }

    #[test]
    fn test_empty_training_set_rejected() {
        let x = Array2::<f64>::zeros((0, 2));
        let y = Array1::<f64>::zeros(0);
        let mut forest = RandomForestRegressor::new(small_config());
        assert_eq!(forest.fit(&x, &y), Err(ModelError::EmptyTrainingSet));
    }

    #[test]
    fn test_bootstrap_sample_is_seeded() {
        assert_eq!(bootstrap_sample(50, 7), bootstrap_sample(50, 7));
        assert_ne!(bootstrap_sample(50, 7), bootstrap_sample(50, 8));
    }
}
