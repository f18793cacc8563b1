//! CART Regression Tree

use crate::ModelError;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Splits with a sum-of-squares reduction below this are not worth taking
const MIN_GAIN: f64 = 1e-12;

/// A node in a regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    /// Internal split: samples with feature <= threshold go left
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    /// Leaf predicting the mean of its training targets
    Leaf { value: f64, n_samples: usize },
}

/// Decision tree regressor using the MSE splitting criterion.
///
/// Thresholds are midpoints between adjacent sorted feature values; leaves
/// predict the mean target of the samples that reached them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Option<TreeNode>,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
}

impl RegressionTree {
    /// Create an unfitted tree
    pub fn new(
        max_depth: Option<usize>,
        min_samples_split: usize,
        min_samples_leaf: usize,
    ) -> Self {
        Self {
            root: None,
            max_depth,
            min_samples_split: min_samples_split.max(2),
            min_samples_leaf: min_samples_leaf.max(1),
        }
    }

    /// Fit the tree on the full training set
    pub fn fit(&mut self, x: &Array2<f64>, y: &[f64]) -> Result<(), ModelError> {
        if x.nrows() != y.len() {
            return Err(ModelError::SampleMismatch {
                x_rows: x.nrows(),
                y_len: y.len(),
            });
        }
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.fit_on_indices(x, y, indices)
    }

    /// Fit the tree on a subset of rows (used for bootstrap samples)
    pub(crate) fn fit_on_indices(
        &mut self,
        x: &Array2<f64>,
        y: &[f64],
        indices: Vec<usize>,
    ) -> Result<(), ModelError> {
        if indices.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        self.root = Some(self.build(x, y, indices, 0));
        Ok(())
    }

    /// Predict the value for a single feature row
    pub fn predict_row(&self, row: ArrayView1<f64>) -> Result<f64, ModelError> {
        let mut node = self.root.as_ref().ok_or(ModelError::NotFitted)?;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Depth of the fitted tree; 0 for a single leaf
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, node_depth)
    }

    fn build(&self, x: &Array2<f64>, y: &[f64], indices: Vec<usize>, depth: usize) -> TreeNode {
        let n_samples = indices.len();
        let (sum, sum_sq) = target_sums(y, &indices);
        let mean = sum / n_samples as f64;
        let sse = sum_sq - sum * sum / n_samples as f64;

        let depth_capped = self.max_depth.is_some_and(|max| depth >= max);
        if n_samples < self.min_samples_split || depth_capped || sse < MIN_GAIN {
            return TreeNode::Leaf {
                value: mean,
                n_samples,
            };
        }

        let Some((feature, threshold)) = self.best_split(x, y, &indices, sum, sum_sq, sse) else {
            return TreeNode::Leaf {
                value: mean,
                n_samples,
            };
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x[[i, feature]] <= threshold);

        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(self.build(x, y, left, depth + 1)),
            right: Box::new(self.build(x, y, right, depth + 1)),
        }
    }

    /// Scan every feature for the threshold with the lowest post-split
    /// sum of squared errors.
    fn best_split(
        &self,
        x: &Array2<f64>,
        y: &[f64],
        indices: &[usize],
        total_sum: f64,
        total_sq: f64,
        parent_sse: f64,
    ) -> Option<(usize, f64)> {
        let n = indices.len() as f64;
        let mut best: Option<(usize, f64, f64)> = None;

        for feature in 0..x.ncols() {
            let mut pairs: Vec<(f64, f64)> = indices
                .iter()
                .map(|&i| (x[[i, feature]], y[i]))
                .collect();
            pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 0..pairs.len() - 1 {
                left_sum += pairs[k].1;
                left_sq += pairs[k].1 * pairs[k].1;

                // Only split between distinct feature values
                if pairs[k].0 == pairs[k + 1].0 {
                    continue;
                }

                let n_left = (k + 1) as f64;
                let n_right = n - n_left;
                if ((k + 1) < self.min_samples_leaf)
                    || ((pairs.len() - k - 1) < self.min_samples_leaf)
                {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / n_left)
                    + (right_sq - right_sum * right_sum / n_right);

                if sse < parent_sse - MIN_GAIN
                    && best.map_or(true, |(_, _, best_sse)| sse < best_sse)
                {
                    let threshold = (pairs[k].0 + pairs[k + 1].0) / 2.0;
                    best = Some((feature, threshold, sse));
                }
            }
        }

        best.map(|(feature, threshold, _)| (feature, threshold))
    }
}

fn target_sums(y: &[f64], indices: &[usize]) -> (f64, f64) {
    indices.iter().fold((0.0, 0.0), |(sum, sum_sq), &i| {
        (sum + y[i], sum_sq + y[i] * y[i])
    })
}

fn node_depth(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 0,
        TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_fits_step_function() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = [5.0, 5.0, 5.0, 20.0, 20.0, 20.0];

        let mut tree = RegressionTree::new(None, 2, 1);
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.predict_row(array![2.5].view()).unwrap(), 5.0);
        assert_eq!(tree.predict_row(array![11.0].view()).unwrap(), 20.0);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = [7.0, 7.0, 7.0, 7.0];

        let mut tree = RegressionTree::new(None, 2, 1);
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict_row(array![99.0].view()).unwrap(), 7.0);
    }

    #[test]
    fn test_max_depth_respected() {
        let x = Array2::from_shape_vec((8, 1), (0..8).map(|v| v as f64).collect()).unwrap();
        let y: Vec<f64> = (0..8).map(|v| v as f64).collect();

        let mut tree = RegressionTree::new(Some(2), 2, 1);
        tree.fit(&x, &y).unwrap();
        assert!(tree.depth() <= 2);
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = [1.0, 2.0, 3.0, 4.0];

        // A leaf minimum of 2 forbids peeling off single samples
        let mut tree = RegressionTree::new(None, 2, 2);
        tree.fit(&x, &y).unwrap();

        let low = tree.predict_row(array![1.0].view()).unwrap();
        assert_eq!(low, 1.5);
    }

    #[test]
    fn test_unfitted_prediction_rejected() {
        let tree = RegressionTree::new(None, 2, 1);
        assert_eq!(
            tree.predict_row(array![1.0].view()),
            Err(ModelError::NotFitted)
        );
    }

    #[test]
    fn test_sample_mismatch_rejected() {
        let x = array![[1.0], [2.0]];
        let y = [1.0];
        let mut tree = RegressionTree::new(None, 2, 1);
        assert_eq!(
            tree.fit(&x, &y),
            Err(ModelError::SampleMismatch { x_rows: 2, y_len: 1 })
        );
    }
}
