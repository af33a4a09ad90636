//! Standard scaling for numerical columns

use crate::error::{DepscreenError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Center and spread of one column, learned at fit time
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScalerParams {
    pub center: f64,
    pub scale: f64,
}

/// Z-score standardization with per-column fitted parameters
///
/// Uses the population standard deviation. A zero-variance column keeps a
/// scale of 1.0 so transforming it yields 0.0 instead of NaN.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    params: HashMap<String, ScalerParams>,
    is_fitted: bool,
}

impl StandardScaler {
    /// Create a new unfitted scaler
    pub fn new() -> Self {
        Self {
            params: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Learn mean and standard deviation for each column
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.params.clear();

        for col_name in columns {
            let ca = Self::column_as_f64(df, col_name)?;

            if ca.len() == ca.null_count() {
                return Err(DepscreenError::PreprocessingError(format!(
                    "no values to fit in column {}",
                    col_name
                )));
            }

            let mean = ca.mean().unwrap_or(0.0);
            let std = ca.std(0).unwrap_or(0.0);
            self.params.insert(
                col_name.clone(),
                ScalerParams {
                    center: mean,
                    scale: if std == 0.0 { 1.0 } else { std },
                },
            );
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale one column with the parameters learned at fit time
    ///
    /// Nulls take the column center, so they come out as 0.0.
    pub fn scale_column(&self, df: &DataFrame, col_name: &str) -> Result<Vec<f64>> {
        if !self.is_fitted {
            return Err(DepscreenError::ModelNotFitted);
        }

        let params = self
            .params
            .get(col_name)
            .ok_or_else(|| DepscreenError::FeatureNotFound(col_name.to_string()))?;

        let ca = Self::column_as_f64(df, col_name)?;

        let scaled = ca
            .into_iter()
            .map(|opt| {
                let v = opt.unwrap_or(params.center);
                (v - params.center) / params.scale
            })
            .collect();

        Ok(scaled)
    }

    fn column_as_f64(df: &DataFrame, col_name: &str) -> Result<Float64Chunked> {
        let column = df
            .column(col_name)
            .map_err(|_| DepscreenError::FeatureNotFound(col_name.to_string()))?;
        let values = column.cast(&DataType::Float64).map_err(|e| {
            DepscreenError::PreprocessingError(format!(
                "column {} is not numerical: {}",
                col_name, e
            ))
        })?;
        let ca = values
            .f64()
            .map_err(|e| DepscreenError::DataError(e.to_string()))?;
        Ok(ca.clone())
    }

    /// Fitted parameters for a column
    pub fn params(&self, col_name: &str) -> Option<&ScalerParams> {
        self.params.get(col_name)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
