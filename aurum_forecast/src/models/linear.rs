//! Linear regression model

use crate::error::{ForecastError, Result};
use crate::models::{check_width, RegressionModel};
use serde::{Deserialize, Serialize};

/// Linear regression: intercept plus a weighted sum of the features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    /// Constant term
    pub intercept: f64,
    /// One weight per feature, in schema order
    pub coefficients: Vec<f64>,
}

impl LinearRegressor {
    /// Create a new linear regressor
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    /// Check that every parameter is finite
    pub fn validate(&self) -> Result<()> {
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ForecastError::SchemaLoadError(
                "Linear model has non-finite parameters".to_string(),
            ));
        }
        Ok(())
    }
}

impl RegressionModel for LinearRegressor {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_width(self, features)?;

        let weighted: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(c, x)| c * x)
            .sum();

        Ok(self.intercept + weighted)
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn name(&self) -> &str {
        "Linear Regression"
    }
}
