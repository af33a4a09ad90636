//! Feature preprocessing pipeline

use super::encoder::OrdinalEncoder;
use super::scaler::StandardScaler;
use crate::error::{DepscreenError, Result};
use crate::schema::{CATEGORICAL_COLUMNS, NUMERICAL_COLUMNS};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column transformer over the survey schema
///
/// Ordinal-encodes the categorical block and standardizes the numerical
/// block. The output matrix keeps a fixed column order regardless of the
/// input DataFrame layout: encoded categorical columns first, scaled
/// numerical columns after them. `output_feature_names` returns the names
/// in that same order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    categorical_columns: Vec<String>,
    numerical_columns: Vec<String>,
    encoder: OrdinalEncoder,
    scaler: StandardScaler,
    is_fitted: bool,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor {
    /// Create a preprocessor over the survey schema
    pub fn new() -> Self {
        Self::with_columns(
            CATEGORICAL_COLUMNS.iter().map(|s| s.to_string()).collect(),
            NUMERICAL_COLUMNS.iter().map(|s| s.to_string()).collect(),
        )
    }

    /// Create a preprocessor over explicit column lists
    pub fn with_columns(categorical: Vec<String>, numerical: Vec<String>) -> Self {
        Self {
            categorical_columns: categorical,
            numerical_columns: numerical,
            encoder: OrdinalEncoder::new(),
            scaler: StandardScaler::new(),
            is_fitted: false,
        }
    }

    /// Fit category tables and scaling parameters
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.encoder.fit(df, &self.categorical_columns)?;
        self.scaler.fit(df, &self.numerical_columns)?;
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform a DataFrame into the row-major feature matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(DepscreenError::ModelNotFitted);
        }

        let n_rows = df.height();
        let mut col_data: Vec<Vec<f64>> = Vec::with_capacity(self.n_output_features());

        for col_name in &self.categorical_columns {
            col_data.push(self.encoder.encode_column(df, col_name)?);
        }
        for col_name in &self.numerical_columns {
            col_data.push(self.scaler.scale_column(df, col_name)?);
        }

        let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
        Ok(Array2::from_shape_fn((n_rows, col_refs.len()), |(r, c)| {
            col_refs[c][r]
        }))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Feature names in output column order
    pub fn output_feature_names(&self) -> Vec<String> {
        self.categorical_columns
            .iter()
            .chain(self.numerical_columns.iter())
            .cloned()
            .collect()
    }

    /// Number of output matrix columns
    pub fn n_output_features(&self) -> usize {
        self.categorical_columns.len() + self.numerical_columns.len()
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    pub fn numerical_columns(&self) -> &[String] {
        &self.numerical_columns
    }

    pub fn encoder(&self) -> &OrdinalEncoder {
        &self.encoder
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
