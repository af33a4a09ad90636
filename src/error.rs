//! Error types for the depscreen crate

use thiserror::Error;

/// Result type alias using DepscreenError
pub type Result<T> = std::result::Result<T, DepscreenError>;

/// Main error type for all depscreen operations
#[derive(Error, Debug)]
pub enum DepscreenError {
    /// Data loading or parsing errors
    #[error("Data error: {0}")]
    DataError(String),

    /// Preprocessing errors
    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    /// Model training errors
    #[error("Training error: {0}")]
    TrainingError(String),

    /// Inference errors
    #[error("Inference error: {0}")]
    InferenceError(String),

    /// IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Shape mismatch errors
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    /// Feature column not found
    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    /// Model not fitted
    #[error("Model has not been fitted yet")]
    ModelNotFitted,

    /// Invalid parameter value
    #[error("Invalid parameter {name}: {value} ({reason})")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    /// Invalid input value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Numerical computation errors
    #[error("Computation error: {0}")]
    ComputationError(String),
}

impl From<polars::error::PolarsError> for DepscreenError {
    fn from(err: polars::error::PolarsError) -> Self {
        DepscreenError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for DepscreenError {
    fn from(err: serde_json::Error) -> Self {
        DepscreenError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for DepscreenError {
    fn from(err: ndarray::ShapeError) -> Self {
        DepscreenError::ShapeError {
            expected: "compatible array shape".to_string(),
            actual: err.to_string(),
        }
    }
}
