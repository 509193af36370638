//! Summary statistics over columns that may contain missing values
//!
//! Missing observations are encoded as `NaN`. They are dropped before any
//! statistic is computed.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};

/// Collect the finite values of a column, dropping `NaN` and infinities
pub fn finite_values(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Median of the non-missing values of a column
pub fn median(values: &[f64]) -> Result<f64> {
    let finite = finite_values(values);
    if finite.is_empty() {
        return Err(MathError::InsufficientData(
            "Median requires at least one non-missing value".to_string(),
        ));
    }

    Ok(Data::new(finite).median())
}

/// Mean, standard deviation and range of a column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Arithmetic mean
    pub mean: f64,
    /// Standard deviation
    pub std: f64,
    /// Smallest observation
    pub min: f64,
    /// Largest observation
    pub max: f64,
}

impl SummaryStats {
    /// Summary with the sample standard deviation (N - 1 denominator).
    ///
    /// A single observation has a standard deviation of 0.
    pub fn sample(values: &[f64]) -> Result<Self> {
        let finite = Self::non_empty(values)?;
        let std = if finite.len() > 1 {
            finite.iter().std_dev()
        } else {
            0.0
        };

        Ok(Self::with_std(&finite, std))
    }

    /// Summary with the population standard deviation (N denominator)
    pub fn population(values: &[f64]) -> Result<Self> {
        let finite = Self::non_empty(values)?;
        let std = finite.iter().population_std_dev();

        Ok(Self::with_std(&finite, std))
    }

    fn non_empty(values: &[f64]) -> Result<Vec<f64>> {
        let finite = finite_values(values);
        if finite.is_empty() {
            return Err(MathError::InsufficientData(format!(
                "No non-missing values among {} observations",
                values.len()
            )));
        }
        Ok(finite)
    }

    fn with_std(finite: &[f64], std: f64) -> Self {
        Self {
            mean: finite.iter().mean(),
            std,
            min: finite.iter().copied().fold(f64::INFINITY, f64::min),
            max: finite.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}
