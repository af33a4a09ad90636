//! Training orchestration

use super::grid_search::{ForestParams, GridSearch, ParamGrid, SearchOutcome};
use super::metrics::ClassificationMetrics;
use crate::error::{DepscreenError, Result};
use crate::model::{DependencyModel, ModelMetadata};
use crate::preprocessing::Preprocessor;
use crate::schema::{FEATURE_COLUMNS, TARGET_COLUMN};
use chrono::Utc;
use ndarray::{Array1, Axis};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::info;

/// Settings for one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Name of the 0/1 label column
    pub target_column: String,
    /// Fraction of rows held out for evaluation
    pub test_split: f64,
    /// Forest hyperparameters used when tuning is off
    pub params: ForestParams,
    /// Seed for the split and the forest
    pub random_state: u64,
    /// Grid searched on the training rows before the final fit, when set
    pub tuning_grid: Option<ParamGrid>,
    /// Folds used by the grid search
    pub cv_folds: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            target_column: TARGET_COLUMN.to_string(),
            test_split: 0.2,
            params: ForestParams::default(),
            random_state: 42,
            tuning_grid: None,
            cv_folds: 5,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_split(mut self, test_split: f64) -> Self {
        self.test_split = test_split;
        self
    }

    pub fn with_params(mut self, params: ForestParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_tuning(mut self, grid: ParamGrid) -> Self {
        self.tuning_grid = Some(grid);
        self
    }

    pub fn with_cv_folds(mut self, cv_folds: usize) -> Self {
        self.cv_folds = cv_folds;
        self
    }
}

/// Summary of a completed training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub metrics: ClassificationMetrics,
    pub params: ForestParams,
    pub n_train: usize,
    pub n_test: usize,
    pub n_features: usize,
    pub average_tree_depth: f64,
    pub average_n_leaves: f64,
    pub training_time_secs: f64,
    pub tuning: Option<SearchOutcome>,
}

impl TrainingReport {
    /// Multi-section text report
    pub fn render(&self) -> String {
        let mut report = String::new();
        report.push_str("=== Dependency Screening Training Report ===\n\n");

        report.push_str("--- Data Shape ---\n");
        report.push_str(&format!("Train samples: {}\n", self.n_train));
        report.push_str(&format!("Test samples:  {}\n", self.n_test));
        report.push_str(&format!("Features:      {}\n\n", self.n_features));

        report.push_str("--- Forest ---\n");
        report.push_str(&format!("Trees:             {}\n", self.params.n_estimators));
        report.push_str(&format!(
            "Max depth:         {}\n",
            self.params
                .max_depth
                .map_or("unlimited".to_string(), |d| d.to_string())
        ));
        report.push_str(&format!(
            "Min samples split: {}\n",
            self.params.min_samples_split
        ));
        report.push_str(&format!(
            "Min samples leaf:  {}\n",
            self.params.min_samples_leaf
        ));
        report.push_str(&format!("Avg tree depth:    {:.1}\n", self.average_tree_depth));
        report.push_str(&format!("Avg leaves:        {:.1}\n\n", self.average_n_leaves));

        if let Some(tuning) = &self.tuning {
            report.push_str("--- Tuning ---\n");
            report.push_str(&format!("Candidates:   {}\n", tuning.trials.len()));
            report.push_str(&format!("Best trial:   {}\n", tuning.best_trial_idx));
            report.push_str(&format!("Best mean F1: {:.4}\n\n", tuning.best_score()));
        }

        report.push_str("--- Training Time ---\n");
        report.push_str(&format!("{:.4} seconds\n\n", self.training_time_secs));

        report.push_str("--- Metrics Summary ---\n");
        report.push_str(&format!("Accuracy:  {:.4}\n", self.metrics.accuracy));
        report.push_str(&format!("Precision: {:.4}\n", self.metrics.precision));
        report.push_str(&format!("Recall:    {:.4}\n", self.metrics.recall));
        report.push_str(&format!("F1 Score:  {:.4}\n\n", self.metrics.f1_score));

        report.push_str(&self.metrics.classification_report());
        report
    }
}

/// A trained model plus its evaluation report
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: DependencyModel,
    pub report: TrainingReport,
}

/// Fits the preprocessing pipeline and forest from a labeled survey frame
///
/// Rows are split into stratified train and test portions; the forest only
/// sees the train rows, and the reported metrics come from the held-out
/// test rows. The same seed reproduces the split, the trees and therefore
/// the metrics exactly.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    /// Create a trainer with the given settings
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Validate, split, optionally tune, fit and evaluate
    pub fn train(&self, df: &DataFrame) -> Result<TrainingOutcome> {
        let start = Instant::now();

        self.validate_schema(df)?;
        let y = self.extract_target(df)?;

        // The transformer fits on the full frame; serving replays it as-is
        let mut preprocessor = Preprocessor::new();
        let x = preprocessor.fit_transform(df)?;

        let (train_indices, test_indices) = self.stratified_split_indices(&y)?;
        let x_train = x.select(Axis(0), &train_indices);
        let y_train: Array1<f64> =
            Array1::from_vec(train_indices.iter().map(|&i| y[i]).collect());
        let x_test = x.select(Axis(0), &test_indices);
        let y_test: Array1<f64> = Array1::from_vec(test_indices.iter().map(|&i| y[i]).collect());

        info!(
            n_train = x_train.nrows(),
            n_test = x_test.nrows(),
            n_features = x.ncols(),
            "training random forest"
        );

        let (params, tuning) = match &self.config.tuning_grid {
            Some(grid) => {
                let outcome = GridSearch::new(grid.clone())
                    .with_n_folds(self.config.cv_folds)
                    .with_random_state(self.config.random_state)
                    .run(&x_train, &y_train)?;
                (outcome.best_params(), Some(outcome))
            }
            None => (self.config.params, None),
        };

        let mut forest = params.build_forest(self.config.random_state);
        forest.fit(&x_train, &y_train)?;

        let y_pred = forest.predict(&x_test)?;
        let metrics = ClassificationMetrics::compute(&y_test, &y_pred);

        info!(
            accuracy = metrics.accuracy,
            f1 = metrics.f1_score,
            "evaluation finished"
        );

        let report = TrainingReport {
            metrics: metrics.clone(),
            params,
            n_train: train_indices.len(),
            n_test: test_indices.len(),
            n_features: x.ncols(),
            average_tree_depth: forest.average_depth(),
            average_n_leaves: forest.average_n_leaves(),
            training_time_secs: start.elapsed().as_secs_f64(),
            tuning,
        };

        let metadata = ModelMetadata {
            trained_at: Utc::now(),
            n_training_samples: report.n_train,
            params,
            test_accuracy: metrics.accuracy,
            test_f1: metrics.f1_score,
        };
        let model = DependencyModel::new(preprocessor, forest, metadata)?;

        Ok(TrainingOutcome { model, report })
    }

    fn validate_schema(&self, df: &DataFrame) -> Result<()> {
        if df.height() == 0 {
            return Err(DepscreenError::DataError("dataset has no rows".to_string()));
        }

        for col in FEATURE_COLUMNS.iter() {
            if df.column(col).is_err() {
                return Err(DepscreenError::FeatureNotFound(col.to_string()));
            }
        }
        if df.column(&self.config.target_column).is_err() {
            return Err(DepscreenError::FeatureNotFound(
                self.config.target_column.clone(),
            ));
        }

        Ok(())
    }

    fn extract_target(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let target = df
            .column(&self.config.target_column)
            .map_err(|_| DepscreenError::FeatureNotFound(self.config.target_column.clone()))?;
        let target_f64 = target
            .cast(&DataType::Float64)
            .map_err(|e| DepscreenError::DataError(e.to_string()))?;

        let values: Vec<f64> = target_f64
            .f64()
            .map_err(|e| DepscreenError::DataError(e.to_string()))?
            .into_iter()
            .map(|v| {
                v.ok_or_else(|| {
                    DepscreenError::DataError(format!(
                        "null label in column {}",
                        self.config.target_column
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if values.is_empty() {
            return Err(DepscreenError::DataError(
                "target column is empty".to_string(),
            ));
        }
        for &v in &values {
            if v != 0.0 && v != 1.0 {
                return Err(DepscreenError::DataError(format!(
                    "label {} is not binary (expected 0 or 1)",
                    v
                )));
            }
        }

        Ok(Array1::from_vec(values))
    }

    /// Split row indices so each class keeps the configured test fraction
    fn stratified_split_indices(&self, y: &Array1<f64>) -> Result<(Vec<usize>, Vec<usize>)> {
        let ratio = self.config.test_split;
        if ratio <= 0.0 || ratio >= 1.0 {
            return Err(DepscreenError::InvalidParameter {
                name: "test_split".to_string(),
                value: format!("{}", ratio),
                reason: "must be strictly between 0 and 1".to_string(),
            });
        }

        let mut class_indices: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (i, &label) in y.iter().enumerate() {
            class_indices
                .entry(label.round() as i64)
                .or_default()
                .push(i);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.random_state);
        let mut train_indices = Vec::new();
        let mut test_indices = Vec::new();

        for indices in class_indices.values() {
            let mut indices = indices.clone();
            indices.shuffle(&mut rng);

            let class_test = ((indices.len() as f64) * ratio).round() as usize;
            let class_test = class_test.max(1).min(indices.len().saturating_sub(1));
            let split_point = indices.len() - class_test;

            train_indices.extend_from_slice(&indices[..split_point]);
            test_indices.extend_from_slice(&indices[split_point..]);
        }

        if train_indices.is_empty() || test_indices.is_empty() {
            return Err(DepscreenError::DataError(
                "stratified split produced an empty train or test set".to_string(),
            ));
        }

        Ok((train_indices, test_indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Department, Reason};

    /// Balanced synthetic survey with a strong usage/confidence signal
    fn survey_df(n_per_class: usize) -> DataFrame {
        let n = n_per_class * 2;
        let mut usage = Vec::with_capacity(n);
        let mut duration = Vec::with_capacity(n);
        let mut attempts = Vec::with_capacity(n);
        let mut confidence = Vec::with_capacity(n);
        let mut peer = Vec::with_capacity(n);
        let mut reason = Vec::with_capacity(n);
        let mut cgpa = Vec::with_capacity(n);
        let mut department = Vec::with_capacity(n);
        let mut other_ai = Vec::with_capacity(n);
        let mut prefers = Vec::with_capacity(n);
        let mut label = Vec::with_capacity(n);

        for i in 0..n {
            let dependent = i >= n_per_class;
            reason.push(Reason::ALL[i % Reason::ALL.len()].as_str());
            department.push(Department::ALL[i % Department::ALL.len()].as_str());

            if dependent {
                usage.push(10 + (i % 8) as i64);
                duration.push(60 + 10 * (i % 10) as i64);
                attempts.push((i % 2) as i64);
                confidence.push(1 + (i % 2) as i64);
                peer.push(4 + (i % 2) as i64);
                cgpa.push(5.5 + 0.1 * (i % 10) as f64);
                other_ai.push(1i64);
                prefers.push(1i64);
                label.push(1i64);
            } else {
                usage.push((i % 4) as i64);
                duration.push(5 + 3 * (i % 10) as i64);
                attempts.push(3 + (i % 5) as i64);
                confidence.push(4 + (i % 2) as i64);
                peer.push(1 + (i % 2) as i64);
                cgpa.push(8.0 + 0.15 * (i % 10) as f64);
                other_ai.push(0i64);
                prefers.push(0i64);
                label.push(0i64);
            }
        }

        df!(
            "chatgpt_usage_frequency_per_week" => usage,
            "average_duration_per_session_minutes" => duration,
            "attempt_before_chatgpt" => attempts,
            "confidence_in_solving_alone" => confidence,
            "peer_usage_influence" => peer,
            "reason_for_using_chatgpt" => reason,
            "cgpa" => cgpa,
            "department" => department,
            "used_other_ai_tools" => other_ai,
            "chatgpt_preferred_over_google" => prefers,
            "chatgpt_dependence" => label,
        )
        .unwrap()
    }

    fn quick_config() -> TrainingConfig {
        TrainingConfig::new().with_params(ForestParams {
            n_estimators: 20,
            max_depth: Some(8),
            min_samples_split: 2,
            min_samples_leaf: 1,
        })
    }

    #[test]
    fn test_train_learns_the_survey_signal() {
        let df = survey_df(40);
        let outcome = Trainer::new(quick_config()).train(&df).unwrap();

        assert!(outcome.report.metrics.accuracy > 0.8);
        assert_eq!(outcome.report.n_train + outcome.report.n_test, 80);
        assert_eq!(outcome.report.n_features, FEATURE_COLUMNS.len());
        assert_eq!(outcome.model.feature_names().len(), FEATURE_COLUMNS.len());
    }

    #[test]
    fn test_split_respects_test_fraction() {
        let df = survey_df(40);
        let outcome = Trainer::new(quick_config().with_test_split(0.2))
            .train(&df)
            .unwrap();

        // 8 held-out rows per class
        assert_eq!(outcome.report.n_test, 16);
        assert_eq!(outcome.report.n_train, 64);
    }

    #[test]
    fn test_same_seed_reproduces_metrics() {
        let df = survey_df(30);

        let first = Trainer::new(quick_config().with_random_state(7))
            .train(&df)
            .unwrap();
        let second = Trainer::new(quick_config().with_random_state(7))
            .train(&df)
            .unwrap();

        assert_eq!(
            first.report.metrics.accuracy,
            second.report.metrics.accuracy
        );
        assert_eq!(
            first.report.metrics.f1_score,
            second.report.metrics.f1_score
        );
    }

    #[test]
    fn test_tuning_records_trials() {
        let df = survey_df(30);
        let grid = ParamGrid {
            n_estimators: vec![5, 10],
            max_depth: vec![Some(4)],
            min_samples_split: vec![2],
            min_samples_leaf: vec![1],
        };

        let outcome = Trainer::new(quick_config().with_tuning(grid).with_cv_folds(2))
            .train(&df)
            .unwrap();

        let tuning = outcome.report.tuning.as_ref().unwrap();
        assert_eq!(tuning.trials.len(), 2);
        assert_eq!(outcome.report.params, tuning.best_params());
    }

    #[test]
    fn test_missing_feature_column_fails() {
        let df = survey_df(10).drop("cgpa").unwrap();
        let result = Trainer::new(quick_config()).train(&df);

        assert!(matches!(result, Err(DepscreenError::FeatureNotFound(_))));
    }

    #[test]
    fn test_non_binary_label_fails() {
        let mut df = survey_df(10);
        let bad = Series::new(
            "chatgpt_dependence".into(),
            (0..20).map(|i| (i % 3) as i64).collect::<Vec<i64>>(),
        );
        df.with_column(bad).unwrap();

        let result = Trainer::new(quick_config()).train(&df);
        assert!(matches!(result, Err(DepscreenError::DataError(_))));
    }

    #[test]
    fn test_invalid_test_split_fails() {
        let df = survey_df(10);
        let result = Trainer::new(quick_config().with_test_split(1.5)).train(&df);

        assert!(matches!(
            result,
            Err(DepscreenError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_report_renders_all_sections() {
        let df = survey_df(20);
        let outcome = Trainer::new(quick_config()).train(&df).unwrap();

        let text = outcome.report.render();
        assert!(text.contains("Training Report"));
        assert!(text.contains("Accuracy"));
        assert!(text.contains("Trees"));
        assert!(text.contains("precision"));
    }
}
