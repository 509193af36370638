//! Prediction pipeline
//!
//! A [`PredictionContext`] is an immutable snapshot of everything a
//! prediction needs: schema, price statistics, fitted model, imputation
//! template and corrector. It is built once (from artifacts on disk or from
//! fixtures) and shared read-only between requests.

use crate::builder::{FeatureRow, FeatureVectorBuilder, ImputationPolicy};
use crate::corrector::{Correction, ExtrapolationCorrector, ExtrapolationSettings};
use crate::data::{DataLoader, DatasetLayout};
use crate::error::{ForecastError, Result};
use crate::models::{ModelArtifact, RegressionModel};
use crate::request::{PredictionRequest, PredictionResult};
use crate::schema::{load_feature_names, FeatureSchema, HistoricalPriceStats};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Locations of the persisted artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    /// Serialized fitted model
    pub model: PathBuf,
    /// Serialized ordered feature-name list
    pub feature_list: PathBuf,
    /// Historical dataset CSV
    pub dataset: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: PathBuf::from("models/gold_price_model.json"),
            feature_list: PathBuf::from("models/feature_cols.json"),
            dataset: PathBuf::from("data/Gold_Price_Regression.csv"),
        }
    }
}

/// Everything besides artifact paths that shapes a snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOptions {
    pub layout: DatasetLayout,
    pub imputation: ImputationPolicy,
    pub extrapolation: ExtrapolationSettings,
}

/// Scored request: the row fed to the model and the correction applied
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionTrace {
    pub row: FeatureRow,
    pub correction: Correction,
    pub result: PredictionResult,
}

/// Immutable snapshot of schema, statistics and model
#[derive(Debug)]
pub struct PredictionContext {
    schema: FeatureSchema,
    price_stats: HistoricalPriceStats,
    model: Box<dyn RegressionModel>,
    builder: FeatureVectorBuilder,
    corrector: ExtrapolationCorrector,
}

impl PredictionContext {
    /// Assemble a context from parts.
    ///
    /// Fails when the model's width differs from the schema's, since the
    /// model reads its input positionally.
    pub fn new(
        schema: FeatureSchema,
        price_stats: HistoricalPriceStats,
        model: Box<dyn RegressionModel>,
        builder: FeatureVectorBuilder,
        settings: ExtrapolationSettings,
    ) -> Result<Self> {
        if model.n_features() != schema.len() {
            return Err(ForecastError::SchemaLoadError(format!(
                "{} expects {} features but the feature list has {}",
                model.name(),
                model.n_features(),
                schema.len()
            )));
        }

        let corrector = ExtrapolationCorrector::new(settings, &price_stats)?;

        Ok(Self {
            schema,
            price_stats,
            model,
            builder,
            corrector,
        })
    }

    /// Load every artifact and compute statistics.
    ///
    /// Any failure here is a schema load error: without its model, feature
    /// list and history the service cannot produce a prediction.
    pub fn load(paths: &ArtifactPaths, options: &LoadOptions) -> Result<Self> {
        let model = ModelArtifact::load(&paths.model)?.into_model()?;
        let names = load_feature_names(&paths.feature_list)?;

        let data = DataLoader::from_csv(&paths.dataset, &options.layout).map_err(|e| {
            ForecastError::SchemaLoadError(format!(
                "Cannot load historical data '{}': {}",
                paths.dataset.display(),
                e
            ))
        })?;

        let schema = FeatureSchema::from_history(names, &data)?;
        let price_stats = HistoricalPriceStats::from_prices(data.target_prices());
        let builder = FeatureVectorBuilder::for_policy(options.imputation, &data);

        tracing::info!(
            model = model.name(),
            features = schema.len(),
            rows = data.len(),
            price_min = price_stats.min,
            price_max = price_stats.max,
            fallback_prices = price_stats.fallback,
            imputation = ?options.imputation,
            "loaded prediction context"
        );

        Self::new(schema, price_stats, model, builder, options.extrapolation)
    }

    /// Predict the closing price for a validated request
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        self.trace(request).map(|trace| trace.result)
    }

    /// Predict and keep every intermediate value
    pub fn trace(&self, request: &PredictionRequest) -> Result<PredictionTrace> {
        let row = self.builder.build(request, &self.schema)?;

        let base_prediction = self.model.predict(row.values())?;
        if !base_prediction.is_finite() {
            return Err(ForecastError::ComputationError(format!(
                "{} returned a non-finite prediction",
                self.model.name()
            )));
        }

        let correction = self.corrector.explain(base_prediction, request.year());
        tracing::debug!(
            year = request.year(),
            month = request.month(),
            day = request.day(),
            base_prediction,
            trend_factor = correction.trend_factor,
            cyclic_factor = correction.cyclic_factor,
            clamped = correction.clamped,
            price = correction.price,
            "scored prediction request"
        );

        let result = PredictionResult::new(request, correction.price);
        Ok(PredictionTrace {
            row,
            correction,
            result,
        })
    }

    /// Get the feature schema
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Get the historical price statistics
    pub fn price_stats(&self) -> &HistoricalPriceStats {
        &self.price_stats
    }

    /// Get the corrector
    pub fn corrector(&self) -> &ExtrapolationCorrector {
        &self.corrector
    }

    /// Get the imputation policy
    pub fn imputation(&self) -> ImputationPolicy {
        self.builder.policy()
    }

    /// Get the model's name
    pub fn model_name(&self) -> &str {
        self.model.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DAY, DAY_OF_WEEK, MONTH, YEAR};
    use crate::models::LinearRegressor;

    fn context(intercept: f64, coefficients: Vec<f64>) -> Result<PredictionContext> {
        let names = [YEAR, MONTH, DAY, DAY_OF_WEEK]
            .iter()
            .map(|s| s.to_string())
            .collect();
        PredictionContext::new(
            FeatureSchema::new(names)?,
            HistoricalPriceStats::new(1500.0, 250.0, 1000.0, 2000.0),
            Box::new(LinearRegressor::new(intercept, coefficients)),
            FeatureVectorBuilder::new(),
            ExtrapolationSettings::default(),
        )
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let result = context(1300.0, vec![0.0; 3]);
        assert!(matches!(result, Err(ForecastError::SchemaLoadError(_))));
    }

    #[test]
    fn test_center_year_example() {
        let context = context(1300.0, vec![0.0; 4]).unwrap();
        let request = PredictionRequest::new(2015, 6, 15, 0.0).unwrap();
        let result = context.predict(&request).unwrap();
        assert_eq!(result.predicted_price, 1300.0);
    }

    #[test]
    fn test_trace_exposes_row() {
        let context = context(1300.0, vec![0.0; 4]).unwrap();
        let request = PredictionRequest::new(2024, 1, 1, 0.0).unwrap();
        let trace = context.trace(&request).unwrap();
        assert_eq!(trace.row.values(), &[2024.0, 1.0, 1.0, 0.0]);
        assert_eq!(trace.correction.year_deviation, 9);
    }

    #[test]
    fn test_non_finite_model_output() {
        let context = context(f64::MAX, vec![f64::MAX, 0.0, 0.0, 0.0]).unwrap();
        let request = PredictionRequest::new(2015, 6, 15, 0.0).unwrap();
        let err = context.predict(&request).unwrap_err();
        assert!(matches!(err, ForecastError::ComputationError(_)));
        assert!(!err.is_client_error());
    }
}
