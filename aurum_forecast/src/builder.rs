//! Feature vector construction
//!
//! Turns a sparse [`PredictionRequest`] into a complete [`FeatureRow`] in
//! schema order. Five features come from the request; every other feature
//! is imputed from history.

use crate::data::{HistoricalData, DAY, DAY_OF_WEEK, INFLATION_RATE, MONTH, YEAR};
use crate::error::Result;
use crate::request::PredictionRequest;
use crate::schema::FeatureSchema;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Features whose values are taken from the request rather than imputed
pub const REQUEST_FEATURES: [&str; 5] = [YEAR, MONTH, DAY, DAY_OF_WEEK, INFLATION_RATE];

/// Where imputed features get their baseline value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationPolicy {
    /// Every imputed feature is its historical median
    #[default]
    Medians,
    /// Start from the first historical row and fall back to the median
    /// only where that row is missing a value
    FirstRow,
}

/// Complete, ordered assignment of a value to every schema feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureRow {
    /// Get the values in schema order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the feature names in schema order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Get one feature's value
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// Iterate over `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Get the number of features
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row has no features
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builds feature rows for prediction requests
#[derive(Debug, Clone, Default)]
pub struct FeatureVectorBuilder {
    /// Baseline values for imputed features; empty under the median policy
    template: HashMap<String, f64>,
    policy: ImputationPolicy,
}

impl FeatureVectorBuilder {
    /// Builder that imputes every non-request feature with its median
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder that starts from a given template row
    pub fn with_template_row(template: HashMap<String, f64>) -> Self {
        Self {
            template,
            policy: ImputationPolicy::FirstRow,
        }
    }

    /// Builder for an imputation policy over a historical dataset
    pub fn for_policy(policy: ImputationPolicy, data: &HistoricalData) -> Self {
        match policy {
            ImputationPolicy::Medians => Self::new(),
            ImputationPolicy::FirstRow => {
                Self::with_template_row(data.row(0).unwrap_or_default())
            }
        }
    }

    /// Get the imputation policy
    pub fn policy(&self) -> ImputationPolicy {
        self.policy
    }

    /// Build the feature row for a request.
    ///
    /// Fails with `InvalidDate` when the request's year, month and day do
    /// not form a calendar date. Features with neither a template value nor
    /// a historical median are set to 0.
    pub fn build(&self, request: &PredictionRequest, schema: &FeatureSchema) -> Result<FeatureRow> {
        let date = request.date()?;
        let day_of_week = date.weekday().num_days_from_monday();

        let values = schema
            .names()
            .iter()
            .map(|name| match name.as_str() {
                YEAR => request.year() as f64,
                MONTH => request.month() as f64,
                DAY => request.day() as f64,
                DAY_OF_WEEK => day_of_week as f64,
                INFLATION_RATE => request.inflation_rate(),
                other => self.impute(other, schema),
            })
            .collect();

        Ok(FeatureRow {
            names: schema.names().to_vec(),
            values,
        })
    }

    fn impute(&self, name: &str, schema: &FeatureSchema) -> f64 {
        self.template
            .get(name)
            .copied()
            .filter(|v| !v.is_nan())
            .or_else(|| schema.median(name))
            .unwrap_or(0.0)
    }
}
