//! # Aurum Math
//!
//! Numeric helpers for historical indicator columns.
//! Every function here treats `NaN` as a missing observation and skips it,
//! so a column with gaps never poisons a mean, median or bound.

use thiserror::Error;

pub mod series;
pub mod summary;

pub use series::{forward_fill, pct_change, round_to};
pub use summary::{finite_values, median, SummaryStats};

/// Errors that can occur in statistical calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for statistical operations
pub type Result<T> = std::result::Result<T, MathError>;
