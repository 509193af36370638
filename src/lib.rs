//! # Aurum
//!
//! `aurum_workspace` bundles the gold price prediction crates:
//!
//! - [`math`]: missing-value aware statistics
//! - [`forecast`]: feature construction, model scoring and extrapolation correction
//! - [`server`]: the HTTP prediction service
//!
//! ## Example
//!
//! ```
//! use aurum_workspace::forecast::{
//!     ExtrapolationSettings, FeatureSchema, FeatureVectorBuilder, HistoricalPriceStats,
//!     PredictionContext, PredictionRequest,
//! };
//! use aurum_workspace::forecast::models::LinearRegressor;
//!
//! let names = ["year", "month", "day", "dayofweek"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//!
//! let context = PredictionContext::new(
//!     FeatureSchema::new(names).unwrap(),
//!     HistoricalPriceStats::new(1500.0, 250.0, 1000.0, 2000.0),
//!     Box::new(LinearRegressor::new(1300.0, vec![0.0; 4])),
//!     FeatureVectorBuilder::new(),
//!     ExtrapolationSettings::default(),
//! )
//! .unwrap();
//!
//! let request = PredictionRequest::new(2015, 6, 15, 0.0).unwrap();
//! assert_eq!(context.predict(&request).unwrap().predicted_price, 1300.0);
//! ```

pub use aurum_forecast as forecast;
pub use aurum_math as math;
pub use aurum_server as server;
