//! Classification decision tree

use crate::error::{DepscreenError, Result};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node holding the class distribution of its training samples
    Leaf {
        distribution: Vec<f64>,
        n_samples: usize,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Criterion {
    Gini,
    Entropy,
}

/// CART classifier
///
/// Leaves store full class distributions rather than a single label, so an
/// ensemble can average them into calibrated probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree root
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features sampled per split (all when None)
    pub max_features: Option<usize>,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Seed for per-split feature subsampling
    pub seed: u64,
    /// Number of features
    n_features: usize,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
    /// Sorted class labels; leaf distributions align to this order
    classes: Vec<f64>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    /// Create a new tree with default parameters
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            criterion: Criterion::Gini,
            seed: 42,
            n_features: 0,
            feature_importances: None,
            classes: Vec::new(),
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set the number of features sampled per split
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Set criterion
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the feature-subsampling seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fix the class set ahead of fitting
    ///
    /// An ensemble passes the full label set here so a bootstrap sample
    /// missing a class still yields distributions of the same width.
    pub fn with_classes(mut self, classes: Vec<f64>) -> Self {
        self.classes = classes;
        self
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(DepscreenError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        if n_samples < self.min_samples_split {
            return Err(DepscreenError::ValidationError(format!(
                "need at least {} samples, got {}",
                self.min_samples_split, n_samples
            )));
        }

        if self.classes.is_empty() {
            let mut classes: Vec<f64> = y.iter().copied().collect();
            classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            classes.dedup();
            self.classes = classes;
        }
        if self.classes.is_empty() {
            return Err(DepscreenError::TrainingError(
                "no classes in training labels".to_string(),
            ));
        }

        // Map labels to class indices once so split counting stays integral
        let y_idx = y
            .iter()
            .map(|&label| {
                Self::class_index(&self.classes, label).ok_or_else(|| {
                    DepscreenError::TrainingError(format!(
                        "label {} is not in the class set",
                        label
                    ))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        self.n_features = n_features;

        let mut importances = vec![0.0; n_features];
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, &y_idx, &indices, 0, &mut importances, &mut rng));

        // Normalize feature importances
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y_idx: &[usize],
        indices: &[usize],
        depth: usize,
        importances: &mut [f64],
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let counts = self.class_counts(y_idx, indices);
        let parent_impurity = self.impurity_from_counts(&counts, n_samples);

        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let should_stop = n_samples < self.min_samples_split
            || n_samples <= self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || is_pure;

        if should_stop {
            return Self::leaf_from_counts(&counts, n_samples);
        }

        if let Some((best_feature, best_threshold, best_gain)) =
            self.find_best_split(x, y_idx, indices, parent_impurity, rng)
        {
            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| x[[i, best_feature]] <= best_threshold);

            if left_indices.len() < self.min_samples_leaf
                || right_indices.len() < self.min_samples_leaf
            {
                return Self::leaf_from_counts(&counts, n_samples);
            }

            importances[best_feature] += n_samples as f64 * best_gain;

            let left = Box::new(self.build_tree(x, y_idx, &left_indices, depth + 1, importances, rng));
            let right =
                Box::new(self.build_tree(x, y_idx, &right_indices, depth + 1, importances, rng));

            TreeNode::Split {
                feature_idx: best_feature,
                threshold: best_threshold,
                left,
                right,
                n_samples,
                impurity: parent_impurity,
            }
        } else {
            Self::leaf_from_counts(&counts, n_samples)
        }
    }

    /// Scan a feature subset for the split with the best impurity gain
    ///
    /// The subset is drawn from the seeded rng before the parallel scan, so
    /// the result depends only on data and seed, never on thread timing.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y_idx: &[usize],
        indices: &[usize],
        parent_impurity: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<(usize, f64, f64)> {
        let n_features = x.ncols();
        let k = self
            .max_features
            .unwrap_or(n_features)
            .min(n_features)
            .max(1);

        let mut subset: Vec<usize> = (0..n_features).collect();
        if k < n_features {
            subset.shuffle(rng);
            subset.truncate(k);
            subset.sort_unstable();
        }

        let n_classes = self.classes.len();
        let total_counts = self.class_counts(y_idx, indices);

        let feature_results: Vec<Option<(usize, f64, f64)>> = subset
            .into_par_iter()
            .map(|feature_idx| {
                let mut order: Vec<usize> = indices.to_vec();
                order.sort_by(|&a, &b| {
                    x[[a, feature_idx]]
                        .partial_cmp(&x[[b, feature_idx]])
                        .unwrap_or(std::cmp::Ordering::Equal)
                });

                let n = order.len();
                let mut left_counts = vec![0usize; n_classes];
                let mut right_counts = total_counts.clone();

                let mut best_gain = 0.0f64;
                let mut best_threshold = 0.0f64;
                let mut pos = 0usize;

                // Sweep sorted values, moving runs of equal values to the left
                // side and evaluating the midpoint threshold after each run
                while pos < n {
                    let v = x[[order[pos], feature_idx]];
                    loop {
                        let class = y_idx[order[pos]];
                        left_counts[class] += 1;
                        right_counts[class] -= 1;
                        pos += 1;
                        if pos == n || x[[order[pos], feature_idx]] != v {
                            break;
                        }
                    }
                    if pos == n {
                        break;
                    }

                    if pos < self.min_samples_leaf || n - pos < self.min_samples_leaf {
                        continue;
                    }

                    let threshold = (v + x[[order[pos], feature_idx]]) / 2.0;
                    let left_impurity = self.impurity_from_counts(&left_counts, pos);
                    let right_impurity = self.impurity_from_counts(&right_counts, n - pos);
                    let weighted = (pos as f64 * left_impurity
                        + (n - pos) as f64 * right_impurity)
                        / n as f64;

                    let gain = parent_impurity - weighted;
                    if gain > best_gain {
                        best_gain = gain;
                        best_threshold = threshold;
                    }
                }

                if best_gain > 0.0 {
                    Some((feature_idx, best_threshold, best_gain))
                } else {
                    None
                }
            })
            .collect();

        // Best across features; strict comparison keeps ties on the lowest index
        feature_results
            .into_iter()
            .flatten()
            .fold(None, |best: Option<(usize, f64, f64)>, cand| match best {
                Some(b) if cand.2 <= b.2 => Some(b),
                _ => Some(cand),
            })
    }

    fn class_counts(&self, y_idx: &[usize], indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.len()];
        for &i in indices {
            counts[y_idx[i]] += 1;
        }
        counts
    }

    fn impurity_from_counts(&self, counts: &[usize], total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let n = total as f64;
        match self.criterion {
            Criterion::Gini => {
                let sum_sq: f64 = counts.iter().map(|&c| (c as f64 / n).powi(2)).sum();
                1.0 - sum_sq
            }
            Criterion::Entropy => -counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.ln()
                })
                .sum::<f64>(),
        }
    }

    fn leaf_from_counts(counts: &[usize], n_samples: usize) -> TreeNode {
        let total = counts.iter().sum::<usize>().max(1) as f64;
        TreeNode::Leaf {
            distribution: counts.iter().map(|&c| c as f64 / total).collect(),
            n_samples,
        }
    }

    fn class_index(classes: &[f64], label: f64) -> Option<usize> {
        classes
            .binary_search_by(|c| c.partial_cmp(&label).unwrap_or(std::cmp::Ordering::Equal))
            .ok()
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;

        let predictions: Vec<f64> = proba
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (j, &p) in row.iter().enumerate() {
                    if p > row[best] {
                        best = j;
                    }
                }
                self.classes[best]
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Predict class distributions, one row per sample
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let root = self.root.as_ref().ok_or(DepscreenError::ModelNotFitted)?;

        let n_classes = self.classes.len();
        let mut proba = Array2::zeros((x.nrows(), n_classes));

        for i in 0..x.nrows() {
            let sample = x.row(i).to_vec();
            let distribution = Self::leaf_distribution(root, &sample);
            for (j, &p) in distribution.iter().enumerate() {
                proba[[i, j]] = p;
            }
        }

        Ok(proba)
    }

    fn leaf_distribution<'a>(node: &'a TreeNode, sample: &[f64]) -> &'a [f64] {
        match node {
            TreeNode::Leaf { distribution, .. } => distribution,
            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
                ..
            } => {
                if sample[*feature_idx] <= *threshold {
                    Self::leaf_distribution(left, sample)
                } else {
                    Self::leaf_distribution(right, sample)
                }
            }
        }
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Sorted class labels
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        match &self.root {
            None => 0,
            Some(node) => Self::node_depth(node),
        }
    }

    fn node_depth(node: &TreeNode) -> usize {
        match node {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => {
                1 + Self::node_depth(left).max(Self::node_depth(right))
            }
        }
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        match &self.root {
            None => 0,
            Some(node) => Self::count_leaves(node),
        }
    }

    fn count_leaves(node: &TreeNode) -> usize {
        match node {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => {
                Self::count_leaves(left) + Self::count_leaves(right)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_perfect_split() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        assert_eq!(predictions, y);
    }

    #[test]
    fn test_leaf_distributions_sum_to_one() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![0.0, 1.0, 0.0, 1.0, 1.0, 1.0];

        let mut tree = DecisionTree::new().with_max_depth(1);
        tree.fit(&x, &y).unwrap();

        let proba = tree.predict_proba(&x).unwrap();
        for row in proba.rows() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_pure_labels_make_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 1.0, 1.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.get_n_leaves(), 1);
        assert_eq!(tree.predict(&x).unwrap(), array![1.0, 1.0, 1.0]);
        assert_eq!(tree.predict_proba(&x).unwrap()[[0, 0]], 1.0);
    }

    #[test]
    fn test_importances_concentrate_on_informative_feature() {
        // Feature 0 separates the classes, feature 1 is constant
        let x = array![
            [1.0, 5.0],
            [2.0, 5.0],
            [3.0, 5.0],
            [10.0, 5.0],
            [11.0, 5.0],
            [12.0, 5.0]
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        let importances = tree.feature_importances().unwrap();
        assert!((importances.sum() - 1.0).abs() < 1e-12);
        assert!(importances[0] > 0.99);
        assert!(importances[1] < 1e-12);
    }

    #[test]
    fn test_provided_class_set_widens_distribution() {
        let x = array![[1.0], [2.0], [10.0], [11.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut tree = DecisionTree::new().with_classes(vec![0.0, 1.0, 2.0]);
        tree.fit(&x, &y).unwrap();

        let proba = tree.predict_proba(&x).unwrap();
        assert_eq!(proba.ncols(), 3);
        for i in 0..proba.nrows() {
            assert_eq!(proba[[i, 2]], 0.0);
        }
    }

    #[test]
    fn test_feature_subsampling_is_seeded() {
        let x = array![
            [1.0, 9.0, 4.0],
            [2.0, 8.0, 3.0],
            [3.0, 7.0, 5.0],
            [10.0, 2.0, 4.0],
            [11.0, 1.0, 6.0],
            [12.0, 0.0, 5.0]
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut first = DecisionTree::new().with_max_features(1).with_seed(7);
        let mut second = DecisionTree::new().with_max_features(1).with_seed(7);
        first.fit(&x, &y).unwrap();
        second.fit(&x, &y).unwrap();

        assert_eq!(first.predict(&x).unwrap(), second.predict(&x).unwrap());
        assert_eq!(
            first.feature_importances().unwrap(),
            second.feature_importances().unwrap()
        );
    }

    #[test]
    fn test_max_depth_limits_tree() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0];

        let mut tree = DecisionTree::new().with_max_depth(1);
        tree.fit(&x, &y).unwrap();

        assert!(tree.get_depth() <= 2);
    }

    #[test]
    fn test_too_few_samples_fails() {
        let x = array![[1.0]];
        let y = array![0.0];

        let mut tree = DecisionTree::new();
        assert!(matches!(
            tree.fit(&x, &y),
            Err(DepscreenError::ValidationError(_))
        ));
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let tree = DecisionTree::new();
        let x = array![[1.0]];
        assert!(matches!(
            tree.predict(&x),
            Err(DepscreenError::ModelNotFitted)
        ));
    }
}
