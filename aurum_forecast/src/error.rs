//! Error types for the aurum_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the aurum_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Request field outside its accepted range, or missing
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Year, month and day that do not name a calendar date
    #[error("Invalid date: {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    /// Model, feature list or dataset could not be loaded
    #[error("Schema load error: {0}")]
    SchemaLoadError(String),

    /// Failure while building a feature row or scoring it
    #[error("Computation error: {0}")]
    ComputationError(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON (de)serialization of artifacts
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// Error from statistical helpers
    #[error("Math error: {0}")]
    MathError(#[from] aurum_math::MathError),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

impl ForecastError {
    /// Whether the caller caused this error through its input.
    ///
    /// Client errors are reported before the model is consulted.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ForecastError::ValidationError(_) | ForecastError::InvalidDate { .. }
        )
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
