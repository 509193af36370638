//! Fitted regression models
//!
//! Models are trained offline and shipped as JSON artifacts. At serving time
//! they are pure functions from an ordered feature vector to a price.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs;
use std::path::Path;

pub mod linear;
pub mod tree_ensemble;

pub use linear::LinearRegressor;
pub use tree_ensemble::{RegressionTree, TreeEnsemble, TreeNode};

/// Fitted regression model
pub trait RegressionModel: Debug + Send + Sync {
    /// Predict a price from a feature vector in schema order
    fn predict(&self, features: &[f64]) -> Result<f64>;

    /// Number of features the model expects
    fn n_features(&self) -> usize;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Serialized form of a fitted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// Ordinary linear regression
    Linear(LinearRegressor),
    /// Gradient-boosted regression trees
    TreeEnsemble(TreeEnsemble),
}

impl ModelArtifact {
    /// Read a model artifact from disk.
    ///
    /// A missing or malformed artifact is a schema load error: the service
    /// cannot start without its model.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ForecastError::SchemaLoadError(format!(
                "Cannot read model artifact '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&text).map_err(|e| {
            ForecastError::SchemaLoadError(format!(
                "Malformed model artifact '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Parse a model artifact from JSON
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Write the artifact as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Check the artifact's structure and turn it into a model
    pub fn into_model(self) -> Result<Box<dyn RegressionModel>> {
        match self {
            ModelArtifact::Linear(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
            ModelArtifact::TreeEnsemble(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
        }
    }
}

/// Reject feature vectors whose width differs from the model's
pub(crate) fn check_width(model: &dyn RegressionModel, features: &[f64]) -> Result<()> {
    if features.len() != model.n_features() {
        return Err(ForecastError::ComputationError(format!(
            "{} expects {} features, got {}",
            model.name(),
            model.n_features(),
            features.len()
        )));
    }
    Ok(())
}
