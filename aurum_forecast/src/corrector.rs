//! Extrapolation correction
//!
//! A model fitted on a bounded range of years extrapolates poorly outside
//! it. The corrector scales the raw prediction by a linear trend and a
//! sinusoidal cycle, both keyed on the distance from the training-center
//! year, then clamps it to a band around the historical price range.
//!
//! ```text
//! deviation = year - training_center_year
//! trend     = 1 + deviation * trend_rate
//! cycle     = 1 + cycle_amplitude * sin(deviation / cycle_period)
//! price     = clamp(round(base * trend * cycle), min * lower_ratio, max * upper_ratio)
//! ```
//!
//! Rounding to cents happens before the clamp, and the band edges are
//! snapped inward to whole cents, so the presented price never leaves the
//! band.

use crate::error::{ForecastError, Result};
use crate::schema::HistoricalPriceStats;
use aurum_math::round_to;
use serde::{Deserialize, Serialize};

/// Reference year from which the year deviation is measured
pub const TRAINING_CENTER_YEAR: i32 = 2015;
/// Relative price change per year of deviation (2.5%, linear)
pub const TREND_RATE_PER_YEAR: f64 = 0.025;
/// Amplitude of the cyclic modulation (15%)
pub const CYCLE_AMPLITUDE: f64 = 0.15;
/// Divisor applied to the year deviation inside the sine
pub const CYCLE_PERIOD_YEARS: f64 = 7.0;
/// Lower clamp as a fraction of the historical minimum price
pub const LOWER_BOUND_RATIO: f64 = 0.5;
/// Upper clamp as a multiple of the historical maximum price
pub const UPPER_BOUND_RATIO: f64 = 3.0;
/// Decimal places of the presented price
pub const PRICE_DECIMALS: i32 = 2;

/// Tunable parameters of the correction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrapolationSettings {
    pub training_center_year: i32,
    pub trend_rate: f64,
    pub cycle_amplitude: f64,
    pub cycle_period: f64,
    pub lower_bound_ratio: f64,
    pub upper_bound_ratio: f64,
}

impl Default for ExtrapolationSettings {
    fn default() -> Self {
        Self {
            training_center_year: TRAINING_CENTER_YEAR,
            trend_rate: TREND_RATE_PER_YEAR,
            cycle_amplitude: CYCLE_AMPLITUDE,
            cycle_period: CYCLE_PERIOD_YEARS,
            lower_bound_ratio: LOWER_BOUND_RATIO,
            upper_bound_ratio: UPPER_BOUND_RATIO,
        }
    }
}

impl ExtrapolationSettings {
    /// Check the settings are usable
    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.trend_rate,
            self.cycle_amplitude,
            self.cycle_period,
            self.lower_bound_ratio,
            self.upper_bound_ratio,
        ]
        .iter()
        .all(|v| v.is_finite());

        if !finite {
            return Err(ForecastError::ValidationError(
                "Extrapolation settings must be finite".to_string(),
            ));
        }
        if self.cycle_period <= 0.0 {
            return Err(ForecastError::ValidationError(
                "Cycle period must be positive".to_string(),
            ));
        }
        if self.lower_bound_ratio < 0.0 || self.lower_bound_ratio > self.upper_bound_ratio {
            return Err(ForecastError::ValidationError(
                "Lower bound ratio must be non-negative and not above the upper bound ratio"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Every intermediate value of one correction, for auditing
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correction {
    pub base_prediction: f64,
    pub year_deviation: i64,
    pub trend_factor: f64,
    pub cyclic_factor: f64,
    /// Base prediction times both factors, before clamping
    pub adjusted: f64,
    /// Whether the clamp changed the adjusted value
    pub clamped: bool,
    /// Final price, rounded to cents and clamped
    pub price: f64,
}

/// Applies the trend and cycle adjustment and the safety clamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrapolationCorrector {
    settings: ExtrapolationSettings,
    min_bound: f64,
    max_bound: f64,
}

impl ExtrapolationCorrector {
    /// Create a corrector whose band is derived from historical prices
    pub fn new(settings: ExtrapolationSettings, prices: &HistoricalPriceStats) -> Result<Self> {
        settings.validate()?;

        let min_bound = snap_to_cents(prices.min * settings.lower_bound_ratio, f64::ceil);
        let max_bound = snap_to_cents(prices.max * settings.upper_bound_ratio, f64::floor);

        Ok(Self {
            settings,
            min_bound,
            // a band narrower than one cent collapses onto its lower edge
            max_bound: max_bound.max(min_bound),
        })
    }

    /// Get the settings
    pub fn settings(&self) -> &ExtrapolationSettings {
        &self.settings
    }

    /// Get the clamp band as `(min, max)`
    pub fn bounds(&self) -> (f64, f64) {
        (self.min_bound, self.max_bound)
    }

    /// Years between the requested year and the training-center year
    pub fn year_deviation(&self, year: i32) -> i64 {
        year as i64 - self.settings.training_center_year as i64
    }

    /// Linear trend multiplier for a year
    pub fn trend_factor(&self, year: i32) -> f64 {
        1.0 + self.year_deviation(year) as f64 * self.settings.trend_rate
    }

    /// Sinusoidal cycle multiplier for a year
    pub fn cyclic_factor(&self, year: i32) -> f64 {
        let deviation = self.year_deviation(year) as f64;
        1.0 + self.settings.cycle_amplitude * (deviation / self.settings.cycle_period).sin()
    }

    /// Correct a raw prediction and report every step
    pub fn explain(&self, base_prediction: f64, year: i32) -> Correction {
        let trend_factor = self.trend_factor(year);
        let cyclic_factor = self.cyclic_factor(year);
        let adjusted = base_prediction * trend_factor * cyclic_factor;
        let rounded = round_to(adjusted, PRICE_DECIMALS);
        let price = rounded.min(self.max_bound).max(self.min_bound);

        Correction {
            base_prediction,
            year_deviation: self.year_deviation(year),
            trend_factor,
            cyclic_factor,
            adjusted,
            clamped: price != rounded,
            price,
        }
    }

    /// Correct a raw prediction
    pub fn correct(&self, base_prediction: f64, year: i32) -> f64 {
        self.explain(base_prediction, year).price
    }
}

/// Move a band edge onto the cent grid with `snap` (`ceil` or `floor`).
///
/// Edges already on the grid up to float noise are kept as they are.
fn snap_to_cents(value: f64, snap: fn(f64) -> f64) -> f64 {
    let factor = 10f64.powi(PRICE_DECIMALS);
    let scaled = value * factor;
    let nearest = scaled.round();
    if (scaled - nearest).abs() < 1e-6 {
        nearest / factor
    } else {
        snap(scaled) / factor
    }
}
