//! Ordinal encoding for categorical columns

use crate::error::{DepscreenError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Code assigned to categories never seen during fit (and to nulls)
pub const UNSEEN_CATEGORY: f64 = -1.0;

/// Per-column category tables, fitted once and reused verbatim at serving
///
/// Categories are stored sorted, so the code a value receives depends only
/// on the set of values observed at fit time, not on row order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    categories: HashMap<String, Vec<String>>,
    is_fitted: bool,
}

impl OrdinalEncoder {
    /// Create a new unfitted encoder
    pub fn new() -> Self {
        Self {
            categories: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Learn one sorted category table per column
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.categories.clear();

        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| DepscreenError::FeatureNotFound(col_name.clone()))?;
            let ca = column.str().map_err(|e| {
                DepscreenError::PreprocessingError(format!(
                    "column {} is not categorical: {}",
                    col_name, e
                ))
            })?;

            let mut cats: Vec<String> = ca.into_iter().flatten().map(str::to_string).collect();
            cats.sort();
            cats.dedup();

            if cats.is_empty() {
                return Err(DepscreenError::PreprocessingError(format!(
                    "no categories found in column {}",
                    col_name
                )));
            }

            self.categories.insert(col_name.clone(), cats);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Encode one column; unseen values and nulls map to the sentinel
    pub fn encode_column(&self, df: &DataFrame, col_name: &str) -> Result<Vec<f64>> {
        if !self.is_fitted {
            return Err(DepscreenError::ModelNotFitted);
        }

        let table = self
            .categories
            .get(col_name)
            .ok_or_else(|| DepscreenError::FeatureNotFound(col_name.to_string()))?;

        let column = df
            .column(col_name)
            .map_err(|_| DepscreenError::FeatureNotFound(col_name.to_string()))?;
        let ca = column.str().map_err(|e| {
            DepscreenError::PreprocessingError(format!(
                "column {} is not categorical: {}",
                col_name, e
            ))
        })?;

        let encoded = ca
            .into_iter()
            .map(|opt| match opt {
                Some(value) => table
                    .binary_search_by(|c| c.as_str().cmp(value))
                    .map(|idx| idx as f64)
                    .unwrap_or(UNSEEN_CATEGORY),
                None => UNSEEN_CATEGORY,
            })
            .collect();

        Ok(encoded)
    }

    /// The fitted category table for a column
    pub fn categories(&self, col_name: &str) -> Option<&[String]> {
        self.categories.get(col_name).map(|c| c.as_slice())
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
