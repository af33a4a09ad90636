//! Persisted model artifact

use crate::error::{DepscreenError, Result};
use crate::preprocessing::Preprocessor;
use crate::schema::DependencyLabel;
use crate::training::{ForestParams, RandomForest};
use chrono::{DateTime, Utc};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Provenance recorded alongside the fitted pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub trained_at: DateTime<Utc>,
    pub n_training_samples: usize,
    pub params: ForestParams,
    pub test_accuracy: f64,
    pub test_f1: f64,
}

/// Fitted preprocessing pipeline and forest, saved and loaded as one unit
///
/// Serving depends on the artifact alone: category tables, scaling
/// parameters, trees and the transformed feature-name order all travel
/// together, so an assessment never recomputes statistics from data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyModel {
    preprocessor: Preprocessor,
    forest: RandomForest,
    feature_names: Vec<String>,
    metadata: ModelMetadata,
}

impl DependencyModel {
    /// Bundle a fitted preprocessor and forest
    pub fn new(
        preprocessor: Preprocessor,
        forest: RandomForest,
        metadata: ModelMetadata,
    ) -> Result<Self> {
        if !preprocessor.is_fitted() || !forest.is_fitted() {
            return Err(DepscreenError::ModelNotFitted);
        }

        let feature_names = preprocessor.output_feature_names();
        Ok(Self {
            preprocessor,
            forest,
            feature_names,
            metadata,
        })
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!(path = %path.display(), "saved model artifact");
        Ok(())
    }

    /// Load a saved artifact
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&json)?;
        info!(
            path = %path.display(),
            trained_at = %model.metadata.trained_at,
            "loaded model artifact"
        );
        Ok(model)
    }

    /// Predict a label for each row
    pub fn predict(&self, df: &DataFrame) -> Result<Vec<DependencyLabel>> {
        let x = self.preprocessor.transform(df)?;
        let raw = self.forest.predict(&x)?;
        Ok(raw
            .iter()
            .map(|&v| DependencyLabel::from_class(v.round() as i64))
            .collect())
    }

    /// Probability of the dependent class for each row
    ///
    /// A model trained without any dependent examples scores everything 0.
    pub fn dependent_probability(&self, df: &DataFrame) -> Result<Vec<f64>> {
        let x = self.preprocessor.transform(df)?;
        let proba = self.forest.predict_proba(&x)?;

        let positive_idx = self.forest.classes().iter().position(|&c| c == 1.0);
        let probs = (0..proba.nrows())
            .map(|i| positive_idx.map_or(0.0, |j| proba[[i, j]]))
            .collect();

        Ok(probs)
    }

    /// Full probability matrix, columns in class order
    pub fn predict_proba(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let x = self.preprocessor.transform(df)?;
        self.forest.predict_proba(&x)
    }

    /// Importances paired with transformed feature names, highest first
    pub fn feature_importances(&self) -> Result<Vec<(String, f64)>> {
        let importances = self
            .forest
            .feature_importances()
            .ok_or(DepscreenError::ModelNotFitted)?;

        if importances.len() != self.feature_names.len() {
            return Err(DepscreenError::ShapeError {
                expected: format!("{} importances", self.feature_names.len()),
                actual: format!("{} importances", importances.len()),
            });
        }

        let mut pairs: Vec<(String, f64)> = self
            .feature_names
            .iter()
            .cloned()
            .zip(importances.iter().copied())
            .collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(pairs)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn tiny_model() -> (DependencyModel, DataFrame) {
        let df = df!(
            "department" => ["IT", "MECH", "IT", "CIVIL", "EXTC", "MECH"],
            "usage" => [1.0, 2.0, 3.0, 14.0, 15.0, 16.0],
        )
        .unwrap();

        let mut preprocessor = Preprocessor::with_columns(
            vec!["department".to_string()],
            vec!["usage".to_string()],
        );
        let x = preprocessor.fit_transform(&df).unwrap();
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut forest = RandomForest::new(10).with_random_state(42);
        forest.fit(&x, &y).unwrap();

        let metadata = ModelMetadata {
            trained_at: Utc::now(),
            n_training_samples: 6,
            params: ForestParams::default(),
            test_accuracy: 1.0,
            test_f1: 1.0,
        };

        (
            DependencyModel::new(preprocessor, forest, metadata).unwrap(),
            df,
        )
    }

    #[test]
    fn test_labels_agree_with_probabilities() {
        let (model, df) = tiny_model();

        let labels = model.predict(&df).unwrap();
        let probs = model.dependent_probability(&df).unwrap();

        assert_eq!(labels.len(), 6);
        assert_eq!(probs.len(), 6);
        for (label, &p) in labels.iter().zip(probs.iter()) {
            assert!((0.0..=1.0).contains(&p));
            assert_eq!(label.is_dependent(), p > 0.5);
        }
    }

    #[test]
    fn test_importances_are_named_and_sorted() {
        let (model, _) = tiny_model();

        let importances = model.feature_importances().unwrap();
        assert_eq!(importances.len(), model.feature_names().len());

        let total: f64 = importances.iter().map(|(_, v)| v).sum();
        assert!((total - 1.0).abs() < 1e-9);
        for pair in importances.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
        // Usage drives the tiny fixture
        assert_eq!(importances[0].0, "usage");
    }

    #[test]
    fn test_save_load_round_trip() {
        let (model, df) = tiny_model();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        model.save(&path).unwrap();
        let reloaded = DependencyModel::load(&path).unwrap();

        assert_eq!(
            model.dependent_probability(&df).unwrap(),
            reloaded.dependent_probability(&df).unwrap()
        );
        assert_eq!(model.feature_names(), reloaded.feature_names());
        assert_eq!(
            model.metadata().n_training_samples,
            reloaded.metadata().n_training_samples
        );
    }

    #[test]
    fn test_unfitted_parts_are_rejected() {
        let (model, _) = tiny_model();

        let unfitted = RandomForest::new(5);
        let metadata = model.metadata().clone();
        let result = DependencyModel::new(model.preprocessor().clone(), unfitted, metadata);

        assert!(matches!(result, Err(DepscreenError::ModelNotFitted)));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = DependencyModel::load(Path::new("/nonexistent/model.json"));
        assert!(matches!(result, Err(DepscreenError::IoError(_))));
    }
}
