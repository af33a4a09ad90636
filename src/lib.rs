//! Depscreen - ChatGPT dependency screening
//!
//! This crate trains a random-forest classifier on an engineering-student
//! survey and serves per-record dependency assessments:
//! - Fit an encoding and scaling pipeline plus the forest from a survey CSV
//! - Persist the whole fitted state as a single JSON artifact
//! - Score one response into a verdict, a dependent-class probability,
//!   triggered tips and verdict-matched guidance
//!
//! # Modules
//!
//! - [`schema`] - The ten-feature survey contract shared by train and serve
//! - [`preprocessing`] - Ordinal encoding and standard scaling
//! - [`training`] - Random forest, stratified splitting, grid search, metrics
//! - [`model`] - The serializable trained artifact
//! - [`inference`] - Single-record scoring engine
//! - [`advice`] - Threshold tips and verdict guidance
//! - [`cli`] - Command-line and interactive interfaces

// Core error handling
pub mod error;

// Survey contract
pub mod schema;

// Core ML modules
pub mod preprocessing;
pub mod training;
pub mod model;
pub mod inference;

// Serving
pub mod advice;

// Services
pub mod cli;

pub use error::{DepscreenError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{DepscreenError, Result};

    // Survey contract
    pub use crate::schema::{
        Department, DependencyLabel, FeatureRecord, Reason, CATEGORICAL_COLUMNS, FEATURE_COLUMNS,
        NUMERICAL_COLUMNS, TARGET_COLUMN,
    };

    // Preprocessing
    pub use crate::preprocessing::{OrdinalEncoder, Preprocessor, StandardScaler};

    // Training
    pub use crate::training::{
        ForestParams, ParamGrid, RandomForest, Trainer, TrainingConfig, TrainingOutcome,
    };

    // Artifact
    pub use crate::model::{DependencyModel, ModelMetadata};

    // Serving
    pub use crate::advice::{tips_for, Tip};
    pub use crate::inference::{Assessment, ScoringEngine};
}
