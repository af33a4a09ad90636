//! Single-record scoring on top of a saved model artifact
//!
//! The [`ScoringEngine`] owns a loaded [`DependencyModel`] and turns one
//! [`FeatureRecord`] into a full [`Assessment`]: verdict, dependent-class
//! probability, triggered tips and verdict-matched guidance.

use crate::advice::{self, Tip};
use crate::error::{DepscreenError, Result};
use crate::model::DependencyModel;
use crate::schema::{DependencyLabel, FeatureRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Outcome of scoring one survey response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub label: DependencyLabel,
    /// Probability of the dependent class
    pub probability: f64,
    /// Tips triggered by the raw answers, independent of the verdict
    pub tips: Vec<Tip>,
    /// General guidance matching the verdict
    pub guidance: Vec<String>,
}

/// Scores survey responses against a trained model
pub struct ScoringEngine {
    model: DependencyModel,
}

impl ScoringEngine {
    /// Load the engine from a model artifact on disk
    pub fn load(path: &Path) -> Result<Self> {
        let model = DependencyModel::load(path)?;
        Ok(Self { model })
    }

    /// Wrap an already-trained model
    pub fn from_model(model: DependencyModel) -> Self {
        Self { model }
    }

    /// Validate and score one record
    pub fn assess(&self, record: &FeatureRecord) -> Result<Assessment> {
        record.validate()?;
        let df = record.to_dataframe()?;

        let labels = self.model.predict(&df)?;
        let probabilities = self.model.dependent_probability(&df)?;
        let label = labels.first().copied().ok_or_else(|| {
            DepscreenError::InferenceError("model returned no prediction for the record".to_string())
        })?;
        let probability = probabilities.first().copied().ok_or_else(|| {
            DepscreenError::InferenceError("model returned no probability for the record".to_string())
        })?;

        let tips = advice::tips_for(record);
        let guidance = if label.is_dependent() {
            advice::dependent_guidance()
        } else {
            advice::balanced_guidance()
        }
        .iter()
        .map(|s| s.to_string())
        .collect();

        debug!(%label, probability, n_tips = tips.len(), "scored survey record");

        Ok(Assessment {
            label,
            probability,
            tips,
            guidance,
        })
    }

    /// Named feature importances, highest first
    pub fn feature_importances(&self) -> Result<Vec<(String, f64)>> {
        self.model.feature_importances()
    }

    pub fn model(&self) -> &DependencyModel {
        &self.model
    }
}
