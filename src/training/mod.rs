//! Model training module
//!
//! Covers the full fit path: stratified splitting, the random forest and
//! its trees, cross-validated grid search and evaluation metrics. The
//! [`Trainer`] ties these together and produces a serialized-ready
//! [`crate::model::DependencyModel`].

pub mod cross_validation;
pub mod decision_tree;
pub mod grid_search;
pub mod metrics;
pub mod random_forest;
pub mod trainer;

pub use cross_validation::{CVResults, CVSplit, StratifiedKFold};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use grid_search::{ForestParams, GridSearch, ParamGrid, SearchOutcome, TrialResult};
pub use metrics::{ClassMetrics, ClassificationMetrics, ConfusionMatrix};
pub use random_forest::{MaxFeatures, RandomForest};
pub use trainer::{Trainer, TrainingConfig, TrainingOutcome, TrainingReport};
