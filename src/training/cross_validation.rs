//! Stratified cross-validation

use crate::error::{DepscreenError, Result};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single train/test split
#[derive(Debug, Clone)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Stratified K-fold splitter
///
/// Every fold keeps the class proportions of the full label array. Classes
/// are visited in label order and their samples dealt round-robin, so the
/// same seed always produces the same folds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StratifiedKFold {
    n_splits: usize,
    shuffle: bool,
    random_state: Option<u64>,
}

impl StratifiedKFold {
    /// Create a splitter with shuffling enabled
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: true,
            random_state: None,
        }
    }

    /// Enable or disable shuffling within each class
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set random state for reproducibility
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Generate train/test splits from the label array
    pub fn split(&self, y: &Array1<f64>) -> Result<Vec<CVSplit>> {
        let n_samples = y.len();

        if self.n_splits < 2 {
            return Err(DepscreenError::ValidationError(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < self.n_splits {
            return Err(DepscreenError::ValidationError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, self.n_splits
            )));
        }

        // Group sample indices by class, in label order
        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, &label) in y.iter().enumerate() {
            class_indices
                .entry(label.round() as i64)
                .or_default()
                .push(idx);
        }

        let mut rng = match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];
        for indices in class_indices.values() {
            let mut indices = indices.clone();
            if self.shuffle {
                indices.shuffle(&mut rng);
            }
            for (i, &idx) in indices.iter().enumerate() {
                folds[i % self.n_splits].push(idx);
            }
        }

        let splits = (0..self.n_splits)
            .map(|fold_idx| {
                let test_indices = folds[fold_idx].clone();
                let train_indices: Vec<usize> = folds
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != fold_idx)
                    .flat_map(|(_, fold)| fold.iter().copied())
                    .collect();
                CVSplit {
                    train_indices,
                    test_indices,
                    fold_idx,
                }
            })
            .collect();

        Ok(splits)
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }
}

/// Aggregated scores across folds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CVResults {
    /// Scores for each fold
    pub scores: Vec<f64>,
    /// Mean score across folds
    pub mean_score: f64,
    /// Standard deviation of scores
    pub std_score: f64,
    /// Number of folds
    pub n_folds: usize,
}

impl CVResults {
    /// Create CV results from fold scores
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n_folds = scores.len();
        if n_folds == 0 {
            return Self {
                scores,
                mean_score: 0.0,
                std_score: 0.0,
                n_folds: 0,
            };
        }

        let mean_score = scores.iter().sum::<f64>() / n_folds as f64;
        let variance =
            scores.iter().map(|s| (s - mean_score).powi(2)).sum::<f64>() / n_folds as f64;
        let std_score = variance.sqrt();

        Self {
            scores,
            mean_score,
            std_score,
            n_folds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n_negative: usize, n_positive: usize) -> Array1<f64> {
        Array1::from_shape_fn(n_negative + n_positive, |i| {
            if i < n_negative {
                0.0
            } else {
                1.0
            }
        })
    }

    #[test]
    fn test_folds_keep_class_proportions() {
        let y = labels(60, 40);
        let cv = StratifiedKFold::new(5).with_random_state(42);
        let splits = cv.split(&y).unwrap();

        assert_eq!(splits.len(), 5);
        for split in &splits {
            assert_eq!(split.test_indices.len(), 20);
            assert_eq!(split.train_indices.len(), 80);

            let positives = split.test_indices.iter().filter(|&&i| y[i] > 0.5).count();
            assert_eq!(positives, 8);
        }
    }

    #[test]
    fn test_test_sets_partition_the_samples() {
        let y = labels(13, 7);
        let cv = StratifiedKFold::new(4).with_random_state(0);
        let splits = cv.split(&y).unwrap();

        let mut all_test: Vec<usize> = splits
            .iter()
            .flat_map(|s| s.test_indices.iter().copied())
            .collect();
        all_test.sort_unstable();
        assert_eq!(all_test, (0..20).collect::<Vec<usize>>());

        for split in &splits {
            for idx in &split.test_indices {
                assert!(!split.train_indices.contains(idx));
            }
        }
    }

    #[test]
    fn test_same_seed_gives_same_folds() {
        let y = labels(30, 20);
        let first = StratifiedKFold::new(5).with_random_state(7).split(&y).unwrap();
        let second = StratifiedKFold::new(5).with_random_state(7).split(&y).unwrap();

        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.test_indices, b.test_indices);
            assert_eq!(a.train_indices, b.train_indices);
        }
    }

    #[test]
    fn test_invalid_parameters_fail() {
        let y = labels(3, 2);

        assert!(StratifiedKFold::new(1).split(&y).is_err());
        assert!(StratifiedKFold::new(10).split(&y).is_err());
    }

    #[test]
    fn test_results_from_scores() {
        let results = CVResults::from_scores(vec![1.0, 0.5]);

        assert_eq!(results.n_folds, 2);
        assert!((results.mean_score - 0.75).abs() < 1e-12);
        assert!((results.std_score - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_results_from_empty_scores() {
        let results = CVResults::from_scores(Vec::new());
        assert_eq!(results.n_folds, 0);
        assert_eq!(results.mean_score, 0.0);
    }
}
