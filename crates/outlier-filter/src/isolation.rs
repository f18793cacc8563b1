//! Isolation Forest Implementation

use crate::FilterError;
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Euler-Mascheroni constant, for the harmonic-number approximation
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Isolation forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsolationForestConfig {
    /// Number of isolation trees
    pub n_estimators: usize,
    /// Sub-sample size per tree (clamped to the row count)
    pub max_samples: usize,
    /// Fraction of rows flagged as anomalous
    pub contamination: f64,
    /// Seed for sub-sampling and split selection
    pub random_state: u64,
}

impl Default for IsolationForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.05,
            random_state: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum IsolationNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<IsolationNode>,
        right: Box<IsolationNode>,
    },
    Leaf {
        size: usize,
    },
}

/// Isolation-based anomaly scorer.
///
/// Each tree recursively partitions a random sub-sample on random features
/// and thresholds; rows isolated in fewer partitions score as more
/// anomalous. Fully seeded: the same matrix and config always produce the
/// same retained set.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    config: IsolationForestConfig,
    trees: Vec<IsolationNode>,
    sample_size: usize,
    n_features: usize,
}

impl IsolationForest {
    /// Create an unfitted forest with the given config
    pub fn new(config: IsolationForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            sample_size: 0,
            n_features: 0,
        }
    }

    /// Build the isolation trees over seeded sub-samples of `x`
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<(), FilterError> {
        let n_rows = x.nrows();
        if n_rows == 0 {
            return Err(FilterError::EmptyMatrix);
        }

        self.sample_size = self.config.max_samples.min(n_rows).max(2);
        self.n_features = x.ncols();
        // Path lengths are capped at the expected depth of a balanced tree
        // over the sub-sample
        let height_limit = (self.sample_size as f64).log2().ceil() as usize;

        self.trees = Vec::with_capacity(self.config.n_estimators);
        for i in 0..self.config.n_estimators {
            let mut rng = StdRng::seed_from_u64(self.config.random_state.wrapping_add(i as u64));
            let indices = rand::seq::index::sample(&mut rng, n_rows, self.sample_size.min(n_rows))
                .into_vec();
            self.trees
                .push(build_tree(x, &indices, 0, height_limit, &mut rng));
        }

        debug!(
            "Fitted isolation forest: {} trees, sub-sample {}",
            self.trees.len(),
            self.sample_size
        );
        Ok(())
    }

    /// Anomaly score per row, in (0, 1]; higher is more anomalous
    pub fn score_samples(&self, x: &Array2<f64>) -> Result<Vec<f64>, FilterError> {
        if self.trees.is_empty() {
            return Err(FilterError::NotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(FilterError::DimensionMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }

        let normalizer = average_path_length(self.sample_size);
        let scores = x
            .rows()
            .into_iter()
            .map(|row| {
                let mean_path = self
                    .trees
                    .iter()
                    .map(|tree| path_length(tree, row, 0))
                    .sum::<f64>()
                    / self.trees.len() as f64;
                2f64.powf(-mean_path / normalizer)
            })
            .collect();
        Ok(scores)
    }

    /// Indices of rows kept after flagging the top `contamination` fraction
    /// as outliers, in original row order
    pub fn retained_indices(&self, x: &Array2<f64>) -> Result<Vec<usize>, FilterError> {
        let scores = self.score_samples(x)?;
        let n_rows = scores.len();
        let n_outliers = ((n_rows as f64) * self.config.contamination).floor() as usize;
        if n_outliers == 0 {
            return Ok((0..n_rows).collect());
        }

        // Highest scores are the outliers; ties resolve to the earlier row
        let mut ranked: Vec<usize> = (0..n_rows).collect();
        ranked.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        let mut outlier = vec![false; n_rows];
        for &idx in ranked.iter().take(n_outliers) {
            outlier[idx] = true;
        }

        Ok((0..n_rows).filter(|&i| !outlier[i]).collect())
    }
}

/// One-shot convenience: fit on `x` and return the retained row indices
pub fn retain_inliers(
    x: &Array2<f64>,
    config: &IsolationForestConfig,
) -> Result<Vec<usize>, FilterError> {
    let mut forest = IsolationForest::new(config.clone());
    forest.fit(x)?;
    forest.retained_indices(x)
}

fn build_tree(
    x: &Array2<f64>,
    indices: &[usize],
    depth: usize,
    height_limit: usize,
    rng: &mut StdRng,
) -> IsolationNode {
    if indices.len() <= 1 || depth >= height_limit {
        return IsolationNode::Leaf {
            size: indices.len(),
        };
    }

    // Candidate features are those not constant over this partition
    let splittable: Vec<(usize, f64, f64)> = (0..x.ncols())
        .filter_map(|j| {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for &i in indices {
                min = min.min(x[[i, j]]);
                max = max.max(x[[i, j]]);
            }
            (max > min).then_some((j, min, max))
        })
        .collect();

    if splittable.is_empty() {
        return IsolationNode::Leaf {
            size: indices.len(),
        };
    }

    let (feature, min, max) = splittable[rng.gen_range(0..splittable.len())];
    let threshold = rng.gen_range(min..max);

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| x[[i, feature]] < threshold);

    IsolationNode::Split {
        feature,
        threshold,
        left: Box::new(build_tree(x, &left, depth + 1, height_limit, rng)),
        right: Box::new(build_tree(x, &right, depth + 1, height_limit, rng)),
    }
}

fn path_length(node: &IsolationNode, row: ArrayView1<f64>, depth: usize) -> f64 {
    match node {
        IsolationNode::Leaf { size } => depth as f64 + average_path_length(*size),
        IsolationNode::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if row[*feature] < *threshold {
                path_length(left, row, depth + 1)
            } else {
                path_length(right, row, depth + 1)
            }
        }
    }
}

// c(n): expected path length of an unsuccessful BST search over n points,
// the normalization factor from Liu/Ting/Zhou.
fn average_path_length(n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n = n as f64;
    let harmonic = (n - 1.0).ln() + EULER_GAMMA;
    2.0 * harmonic - 2.0 * (n - 1.0) / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn clustered_with_outlier() -> Array2<f64> {
        // 39 tightly clustered rows plus one far outlier
        let mut data = Vec::new();
        for i in 0..39 {
            let jitter = (i % 5) as f64 * 0.01;
            data.extend_from_slice(&[1.0 + jitter, 2.0 - jitter]);
        }
        data.extend_from_slice(&[50.0, -50.0]);
        Array2::from_shape_vec((40, 2), data).unwrap()
    }

    #[test]
    fn test_scores_bounded() {
        let x = clustered_with_outlier();
        let mut forest = IsolationForest::new(IsolationForestConfig::default());
        forest.fit(&x).unwrap();

        for (i, score) in forest.score_samples(&x).unwrap().iter().enumerate() {
            assert!(
                (0.0..=1.0).contains(score),
                "score[{i}] = {score} out of bounds"
            );
        }
    }

    #[test]
    fn test_planted_outlier_removed() {
        let x = clustered_with_outlier();
        let retained = retain_inliers(&x, &IsolationForestConfig::default()).unwrap();

        // contamination 0.05 over 40 rows flags exactly 2; the planted
        // outlier must be one of them
        assert_eq!(retained.len(), 38);
        assert!(!retained.contains(&39));
    }

    #[test]
    fn test_retained_order_preserved() {
        let x = clustered_with_outlier();
        let retained = retain_inliers(&x, &IsolationForestConfig::default()).unwrap();
        let mut sorted = retained.clone();
        sorted.sort_unstable();
        assert_eq!(retained, sorted);
    }

    #[test]
    fn test_filter_is_deterministic() {
        let x = clustered_with_outlier();
        let config = IsolationForestConfig::default();
        let first = retain_inliers(&x, &config).unwrap();
        let second = retain_inliers(&x, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_contamination_keeps_everything() {
        let x = clustered_with_outlier();
        let config = IsolationForestConfig {
            contamination: 0.0,
            ..Default::default()
        };
        let retained = retain_inliers(&x, &config).unwrap();
        assert_eq!(retained.len(), 40);
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let x = Array2::<f64>::zeros((0, 4));
        let mut forest = IsolationForest::new(IsolationForestConfig::default());
        assert_eq!(forest.fit(&x), Err(FilterError::EmptyMatrix));
    }

    #[test]
    fn test_score_before_fit_rejected() {
        let x = clustered_with_outlier();
        let forest = IsolationForest::new(IsolationForestConfig::default());
        assert_eq!(forest.score_samples(&x), Err(FilterError::NotFitted));
    }
}
