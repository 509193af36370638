//! Prediction requests and results

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Month used when the request omits one
pub const DEFAULT_MONTH: u32 = 6;
/// Day used when the request omits one
pub const DEFAULT_DAY: u32 = 15;
/// Inflation rate used when the request omits one
pub const DEFAULT_INFLATION_RATE: f64 = 0.0;
/// Lowest accepted inflation rate, in percent
pub const MIN_INFLATION_RATE: f64 = -10.0;
/// Highest accepted inflation rate, in percent
pub const MAX_INFLATION_RATE: f64 = 50.0;

/// Currency of every predicted price
pub const CURRENCY: &str = "USD";
/// Unit of every predicted price
pub const UNIT: &str = "per troy ounce";

/// Raw request body; every field may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionPayload {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub day: Option<i64>,
    pub inflation_rate: Option<f64>,
}

/// Validated prediction request.
///
/// Month, day and inflation rate are range-checked on construction. Whether
/// the three date parts form a real calendar date is checked when the
/// feature row is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionRequest {
    year: i32,
    month: u32,
    day: u32,
    inflation_rate: f64,
}

impl PredictionRequest {
    /// Create a request, rejecting out-of-range fields
    pub fn new(year: i64, month: i64, day: i64, inflation_rate: f64) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ForecastError::ValidationError(
                "Month must be between 1 and 12".to_string(),
            ));
        }
        if !(1..=31).contains(&day) {
            return Err(ForecastError::ValidationError(
                "Day must be between 1 and 31".to_string(),
            ));
        }
        if !(MIN_INFLATION_RATE..=MAX_INFLATION_RATE).contains(&inflation_rate) {
            return Err(ForecastError::ValidationError(
                "Inflation rate must be between -10% and 50%".to_string(),
            ));
        }
        let year = i32::try_from(year).map_err(|_| {
            ForecastError::ValidationError(format!("Year {} is out of range", year))
        })?;

        Ok(Self {
            year,
            month: month as u32,
            day: day as u32,
            inflation_rate,
        })
    }

    /// Create a request from a raw payload, applying defaults
    pub fn from_payload(payload: &PredictionPayload) -> Result<Self> {
        let year = payload
            .year
            .ok_or_else(|| ForecastError::ValidationError("Year is required".to_string()))?;

        Self::new(
            year,
            payload.month.unwrap_or(DEFAULT_MONTH as i64),
            payload.day.unwrap_or(DEFAULT_DAY as i64),
            payload.inflation_rate.unwrap_or(DEFAULT_INFLATION_RATE),
        )
    }

    /// The requested calendar date
    pub fn date(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or(
            ForecastError::InvalidDate {
                year: self.year,
                month: self.month,
                day: self.day,
            },
        )
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn inflation_rate(&self) -> f64 {
        self.inflation_rate
    }
}

/// Predicted price with the request echoed back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted closing price, rounded to cents
    pub predicted_price: f64,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub inflation_rate: f64,
    pub currency: String,
    pub unit: String,
}

impl PredictionResult {
    /// Result for a request and its final price
    pub fn new(request: &PredictionRequest, predicted_price: f64) -> Self {
        Self {
            predicted_price,
            year: request.year,
            month: request.month,
            day: request.day,
            inflation_rate: request.inflation_rate,
            currency: CURRENCY.to_string(),
            unit: UNIT.to_string(),
        }
    }
}
