//! Feature schema and historical statistics
//!
//! A [`FeatureSchema`] is the ordered list of feature names a model was
//! trained on, together with per-feature statistics computed from the
//! historical dataset. The order is significant: models read feature
//! vectors positionally.

use crate::builder::REQUEST_FEATURES;
use crate::data::HistoricalData;
use crate::error::{ForecastError, Result};
use aurum_math::{median, SummaryStats};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Per-feature mean, standard deviation and range
pub type FeatureStats = SummaryStats;

/// Mean of the fallback price band used when the dataset has no prices
pub const FALLBACK_PRICE_MEAN: f64 = 1300.0;
/// Standard deviation of the fallback price band
pub const FALLBACK_PRICE_STD: f64 = 200.0;
/// Lower edge of the fallback price band
pub const FALLBACK_PRICE_MIN: f64 = 1000.0;
/// Upper edge of the fallback price band
pub const FALLBACK_PRICE_MAX: f64 = 2000.0;

/// Summary of the target price over all non-missing historical observations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPriceStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// True when the values are the fallback band rather than observed data
    pub fallback: bool,
}

impl HistoricalPriceStats {
    /// Summarize a price column, dropping missing values.
    ///
    /// With no observed prices the fixed fallback band is returned, so the
    /// service stays available with wider uncertainty instead of failing.
    pub fn from_prices(prices: &[f64]) -> Self {
        match SummaryStats::population(prices) {
            Ok(stats) => Self {
                mean: stats.mean,
                std: stats.std,
                min: stats.min,
                max: stats.max,
                fallback: false,
            },
            Err(_) => {
                tracing::warn!(
                    observations = prices.len(),
                    "no valid historical prices, using fallback price band"
                );
                Self::fallback()
            }
        }
    }

    /// The fixed band used when no historical prices are available
    pub fn fallback() -> Self {
        Self {
            mean: FALLBACK_PRICE_MEAN,
            std: FALLBACK_PRICE_STD,
            min: FALLBACK_PRICE_MIN,
            max: FALLBACK_PRICE_MAX,
            fallback: true,
        }
    }

    /// Observed price stats given explicitly (for fixtures)
    pub fn new(mean: f64, std: f64, min: f64, max: f64) -> Self {
        Self {
            mean,
            std,
            min,
            max,
            fallback: false,
        }
    }
}

/// Ordered feature names plus the statistics used for imputation
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    names: Vec<String>,
    stats: HashMap<String, FeatureStats>,
    medians: HashMap<String, f64>,
}

impl FeatureSchema {
    /// Create a schema without statistics.
    ///
    /// Names must be non-empty and unique.
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(ForecastError::SchemaLoadError(
                "Feature list is empty".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ForecastError::SchemaLoadError(format!(
                    "Duplicate feature name '{}'",
                    name
                )));
            }
        }

        Ok(Self {
            names,
            stats: HashMap::new(),
            medians: HashMap::new(),
        })
    }

    /// Create a schema and compute its statistics from historical data
    pub fn from_history(names: Vec<String>, data: &HistoricalData) -> Result<Self> {
        let mut schema = Self::new(names)?;

        for name in &schema.names {
            let Some(values) = data.column(name) else {
                continue;
            };
            if let Ok(stats) = FeatureStats::sample(values) {
                schema.stats.insert(name.clone(), stats);
            }
            if let Ok(m) = median(values) {
                schema.medians.insert(name.clone(), m);
            }
        }

        let unbacked = schema.unbacked_features();
        if !unbacked.is_empty() {
            tracing::warn!(
                features = ?unbacked,
                "features have no historical values and will be imputed as 0"
            );
        }

        Ok(schema)
    }

    /// Set the imputation median of a feature (for fixtures)
    pub fn with_median(mut self, name: &str, value: f64) -> Self {
        self.medians.insert(name.to_string(), value);
        self
    }

    /// Get the feature names in model order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Get the number of features (never 0, `new` rejects an empty list)
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Get the historical median of a feature
    pub fn median(&self, name: &str) -> Option<f64> {
        self.medians.get(name).copied()
    }

    /// Get the summary statistics of a feature
    pub fn stats(&self, name: &str) -> Option<&FeatureStats> {
        self.stats.get(name)
    }

    /// Statistics of every feature backed by history, in schema order
    pub fn feature_stats(&self) -> impl Iterator<Item = (&str, &FeatureStats)> + '_ {
        self.names
            .iter()
            .filter_map(|name| self.stats(name).map(|stats| (name.as_str(), stats)))
    }

    /// Features that are neither request-derived nor backed by a median.
    ///
    /// These are imputed as 0.
    pub fn unbacked_features(&self) -> Vec<&str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(|name| !REQUEST_FEATURES.contains(name) && !self.medians.contains_key(*name))
            .collect()
    }
}

/// Read the ordered feature-name list from its JSON artifact
pub fn load_feature_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        ForecastError::SchemaLoadError(format!(
            "Cannot read feature list '{}': {}",
            path.display(),
            e
        ))
    })?;

    serde_json::from_str(&text).map_err(|e| {
        ForecastError::SchemaLoadError(format!(
            "Malformed feature list '{}': {}",
            path.display(),
            e
        ))
    })
}
