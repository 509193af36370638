//! # Aurum Forecast
//!
//! A Rust library for predicting the daily closing price of gold from a
//! calendar date and an optional inflation rate.
//!
//! ## Features
//!
//! - Historical dataset loading with derived calendar and inflation columns
//! - Feature schema with per-feature statistics and medians
//! - Fitted models loaded from JSON artifacts (linear, gradient-boosted trees)
//! - Trend and cycle extrapolation correction with a safety clamp
//!
//! ## Imputation
//!
//! A request carries at most five features: `year`, `month`, `day`,
//! `dayofweek` and `inflation_rate`. Every other feature the model was fitted
//! on is imputed according to an [`ImputationPolicy`]:
//!
//! - **Medians** (default): each feature's historical median
//! - **FirstRow**: the first historical row, falling back to the median
//!   where that row is missing a value
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aurum_forecast::pipeline::{ArtifactPaths, LoadOptions, PredictionContext};
//! use aurum_forecast::request::PredictionRequest;
//!
//! # fn main() -> aurum_forecast::error::Result<()> {
//! // Load the model, feature list and historical dataset
//! let context = PredictionContext::load(&ArtifactPaths::default(), &LoadOptions::default())?;
//!
//! // Predict the closing price for 15 June 2030 at 3% inflation
//! let request = PredictionRequest::new(2030, 6, 15, 3.0)?;
//! let result = context.predict(&request)?;
//!
//! println!("{} {} {}", result.predicted_price, result.currency, result.unit);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod corrector;
pub mod data;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod request;
pub mod schema;

// Re-export commonly used types
pub use crate::builder::{FeatureRow, FeatureVectorBuilder, ImputationPolicy};
pub use crate::corrector::{ExtrapolationCorrector, ExtrapolationSettings};
pub use crate::data::{DataLoader, DatasetLayout, HistoricalData};
pub use crate::error::ForecastError;
pub use crate::models::{ModelArtifact, RegressionModel};
pub use crate::pipeline::{ArtifactPaths, LoadOptions, PredictionContext};
pub use crate::request::{PredictionPayload, PredictionRequest, PredictionResult};
pub use crate::schema::{FeatureSchema, HistoricalPriceStats};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
