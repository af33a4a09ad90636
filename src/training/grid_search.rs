//! Exhaustive hyperparameter search

use super::cross_validation::{CVResults, StratifiedKFold};
use super::metrics::ClassificationMetrics;
use super::random_forest::RandomForest;
use crate::error::{DepscreenError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Forest hyperparameters evaluated by one trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl ForestParams {
    /// Build an unfitted forest from these parameters
    pub fn build_forest(&self, random_state: u64) -> RandomForest {
        let mut forest = RandomForest::new(self.n_estimators)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_random_state(random_state);
        if let Some(d) = self.max_depth {
            forest = forest.with_max_depth(d);
        }
        forest
    }
}

/// Candidate values for each tunable forest parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<Option<usize>>,
    pub min_samples_split: Vec<usize>,
    pub min_samples_leaf: Vec<usize>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            n_estimators: vec![100, 200],
            max_depth: vec![None, Some(10), Some(20)],
            min_samples_split: vec![2, 5],
            min_samples_leaf: vec![1, 2],
        }
    }
}

impl ParamGrid {
    /// Enumerate the cartesian product in declaration order
    pub fn candidates(&self) -> Vec<ForestParams> {
        let mut candidates = Vec::with_capacity(
            self.n_estimators.len()
                * self.max_depth.len()
                * self.min_samples_split.len()
                * self.min_samples_leaf.len(),
        );

        for &n_estimators in &self.n_estimators {
            for &max_depth in &self.max_depth {
                for &min_samples_split in &self.min_samples_split {
                    for &min_samples_leaf in &self.min_samples_leaf {
                        candidates.push(ForestParams {
                            n_estimators,
                            max_depth,
                            min_samples_split,
                            min_samples_leaf,
                        });
                    }
                }
            }
        }

        candidates
    }
}

/// Result of scoring one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial_id: usize,
    pub params: ForestParams,
    pub cv: CVResults,
    pub duration_secs: f64,
}

/// All trials plus the winning candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub trials: Vec<TrialResult>,
    pub best_trial_idx: usize,
    pub total_duration_secs: f64,
}

impl SearchOutcome {
    pub fn best_trial(&self) -> &TrialResult {
        &self.trials[self.best_trial_idx]
    }

    pub fn best_params(&self) -> ForestParams {
        self.best_trial().params
    }

    pub fn best_score(&self) -> f64 {
        self.best_trial().cv.mean_score
    }
}

/// Exhaustive search over a parameter grid
///
/// Each candidate is scored by its mean positive-class F1 across stratified
/// folds. Ties keep the earliest candidate in grid order, so reruns with the
/// same seed always select the same parameters.
#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: ParamGrid,
    n_folds: usize,
    random_state: u64,
}

impl GridSearch {
    pub fn new(grid: ParamGrid) -> Self {
        Self {
            grid,
            n_folds: 5,
            random_state: 42,
        }
    }

    pub fn with_n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Score every candidate and pick the best
    pub fn run(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<SearchOutcome> {
        let start = Instant::now();

        let candidates = self.grid.candidates();
        if candidates.is_empty() {
            return Err(DepscreenError::InvalidParameter {
                name: "param_grid".to_string(),
                value: "empty".to_string(),
                reason: "every grid dimension needs at least one candidate".to_string(),
            });
        }

        let splits = StratifiedKFold::new(self.n_folds)
            .with_random_state(self.random_state)
            .split(y)?;

        info!(
            candidates = candidates.len(),
            folds = self.n_folds,
            "starting grid search"
        );

        let mut trials: Vec<TrialResult> = Vec::with_capacity(candidates.len());
        let mut best_trial_idx = 0usize;

        for (trial_id, params) in candidates.into_iter().enumerate() {
            let trial_start = Instant::now();
            let mut scores = Vec::with_capacity(splits.len());

            for split in &splits {
                let x_train = x.select(Axis(0), &split.train_indices);
                let y_train: Array1<f64> =
                    Array1::from_vec(split.train_indices.iter().map(|&i| y[i]).collect());
                let x_test = x.select(Axis(0), &split.test_indices);
                let y_test: Array1<f64> =
                    Array1::from_vec(split.test_indices.iter().map(|&i| y[i]).collect());

                let mut forest = params.build_forest(self.random_state);
                forest.fit(&x_train, &y_train)?;
                let y_pred = forest.predict(&x_test)?;
                scores.push(ClassificationMetrics::f1(&y_test, &y_pred));
            }

            let cv = CVResults::from_scores(scores);
            debug!(
                trial = trial_id,
                n_estimators = params.n_estimators,
                mean_f1 = cv.mean_score,
                std_f1 = cv.std_score,
                "scored grid candidate"
            );

            trials.push(TrialResult {
                trial_id,
                params,
                cv,
                duration_secs: trial_start.elapsed().as_secs_f64(),
            });

            // Strictly-better comparison keeps the earliest candidate on ties
            if trials[trial_id].cv.mean_score > trials[best_trial_idx].cv.mean_score {
                best_trial_idx = trial_id;
            }
        }

        let outcome = SearchOutcome {
            trials,
            best_trial_idx,
            total_duration_secs: start.elapsed().as_secs_f64(),
        };

        info!(
            best_trial = outcome.best_trial_idx,
            mean_f1 = outcome.best_score(),
            "grid search finished"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((40, 2), |(i, j)| {
            let offset = (i % 20) as f64 * 0.1 + j as f64 * 0.05;
            if i < 20 {
                offset
            } else {
                9.0 + offset
            }
        });
        let y = Array1::from_shape_fn(40, |i| if i < 20 { 0.0 } else { 1.0 });
        (x, y)
    }

    fn tiny_grid() -> ParamGrid {
        ParamGrid {
            n_estimators: vec![5, 10],
            max_depth: vec![Some(4)],
            min_samples_split: vec![2],
            min_samples_leaf: vec![1],
        }
    }

    #[test]
    fn test_candidates_follow_declaration_order() {
        let grid = ParamGrid {
            n_estimators: vec![5, 10],
            max_depth: vec![None, Some(3)],
            min_samples_split: vec![2],
            min_samples_leaf: vec![1, 2],
        };

        let candidates = grid.candidates();
        assert_eq!(candidates.len(), 8);
        assert_eq!(
            candidates[0],
            ForestParams {
                n_estimators: 5,
                max_depth: None,
                min_samples_split: 2,
                min_samples_leaf: 1,
            }
        );
        assert_eq!(candidates[1].min_samples_leaf, 2);
        assert_eq!(candidates[7].n_estimators, 10);
    }

    #[test]
    fn test_search_scores_every_candidate() {
        let (x, y) = blob_data();

        let outcome = GridSearch::new(tiny_grid())
            .with_n_folds(2)
            .with_random_state(42)
            .run(&x, &y)
            .unwrap();

        assert_eq!(outcome.trials.len(), 2);
        assert!(outcome.best_score() >= 0.0 && outcome.best_score() <= 1.0);
        for trial in &outcome.trials {
            assert_eq!(trial.cv.n_folds, 2);
        }
    }

    #[test]
    fn test_tie_keeps_earliest_candidate() {
        let (x, y) = blob_data();

        // Two identical candidates always score the same
        let grid = ParamGrid {
            n_estimators: vec![5, 5],
            max_depth: vec![Some(4)],
            min_samples_split: vec![2],
            min_samples_leaf: vec![1],
        };

        let outcome = GridSearch::new(grid)
            .with_n_folds(2)
            .with_random_state(42)
            .run(&x, &y)
            .unwrap();

        assert_eq!(outcome.trials[0].cv.mean_score, outcome.trials[1].cv.mean_score);
        assert_eq!(outcome.best_trial_idx, 0);
    }

    #[test]
    fn test_search_is_reproducible() {
        let (x, y) = blob_data();
        let search = GridSearch::new(tiny_grid()).with_n_folds(2).with_random_state(7);

        let first = search.run(&x, &y).unwrap();
        let second = search.run(&x, &y).unwrap();

        assert_eq!(first.best_trial_idx, second.best_trial_idx);
        for (a, b) in first.trials.iter().zip(second.trials.iter()) {
            assert_eq!(a.cv.scores, b.cv.scores);
        }
    }

    #[test]
    fn test_empty_grid_fails() {
        let grid = ParamGrid {
            n_estimators: Vec::new(),
            max_depth: vec![None],
            min_samples_split: vec![2],
            min_samples_leaf: vec![1],
        };

        let (x, y) = blob_data();
        assert!(GridSearch::new(grid).run(&x, &y).is_err());
    }
}
