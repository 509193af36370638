//! Historical dataset handling
//!
//! The dataset is a CSV file with one date column and numeric indicator
//! columns, one of which is the target price. Missing cells are kept as
//! `NaN` so that downstream statistics can drop them explicitly.

use crate::error::{ForecastError, Result};
use aurum_math::pct_change;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Calendar year derived from the date column
pub const YEAR: &str = "year";
/// Calendar month (1-12) derived from the date column
pub const MONTH: &str = "month";
/// Day of month derived from the date column
pub const DAY: &str = "day";
/// Day of week derived from the date column, Monday = 0
pub const DAY_OF_WEEK: &str = "dayofweek";
/// Period-over-period CPI change in percent
pub const INFLATION_RATE: &str = "inflation_rate";

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Names of the columns with a special role in the dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetLayout {
    /// Column holding the observation date
    pub date_column: String,
    /// Column holding the target closing price
    pub target_column: String,
    /// Column holding the consumer price index, if the dataset carries one
    pub cpi_column: Option<String>,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            date_column: "date".to_string(),
            target_column: "gold close".to_string(),
            cpi_column: Some("CPI".to_string()),
        }
    }
}

/// Historical observations, one `f64` vector per column
#[derive(Debug, Clone)]
pub struct HistoricalData {
    /// Column names in file order, followed by derived columns
    column_names: Vec<String>,
    /// Column values keyed by name; missing cells are `NaN`
    columns: HashMap<String, Vec<f64>>,
    /// Name of the target price column
    target_column: String,
    /// Number of rows
    height: usize,
}

/// Data loader for the historical dataset
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load historical data from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P, layout: &DatasetLayout) -> Result<HistoricalData> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df, layout)
    }

    /// Create historical data from an existing DataFrame
    pub fn from_dataframe(df: DataFrame, layout: &DatasetLayout) -> Result<HistoricalData> {
        let date_column = Self::detect_date_column(&df, &layout.date_column)?;
        let dates = Self::parse_dates(df.column(&date_column)?)?;

        let mut column_names = Vec::new();
        let mut columns = HashMap::new();

        for series in df.get_columns() {
            let name = series.name().to_string();
            if name == date_column {
                continue;
            }
            columns.insert(name.clone(), Self::series_as_f64(series)?);
            column_names.push(name);
        }

        let mut data = HistoricalData {
            column_names,
            columns,
            target_column: layout.target_column.clone(),
            height: df.height(),
        };

        data.set_column(YEAR, Self::date_part(&dates, |d| d.year() as f64));
        data.set_column(MONTH, Self::date_part(&dates, |d| d.month() as f64));
        data.set_column(DAY, Self::date_part(&dates, |d| d.day() as f64));
        data.set_column(
            DAY_OF_WEEK,
            Self::date_part(&dates, |d| d.weekday().num_days_from_monday() as f64),
        );

        if let Some(cpi_column) = &layout.cpi_column {
            if let Some(cpi) = data.column(cpi_column) {
                let inflation = pct_change(cpi)
                    .into_iter()
                    .map(|change| if change.is_nan() { 0.0 } else { change * 100.0 })
                    .collect();
                data.set_column(INFLATION_RATE, inflation);
            }
        }

        if !data.has_column(&layout.target_column) {
            tracing::warn!(
                target_column = %layout.target_column,
                "target column not present in historical data"
            );
        }

        Ok(data)
    }

    /// Find the date column, preferring the configured name
    fn detect_date_column(df: &DataFrame, preferred: &str) -> Result<String> {
        let column_names = df.get_column_names();

        if column_names.iter().any(|name| *name == preferred) {
            return Ok(preferred.to_string());
        }

        for name in &column_names {
            let lower_name = name.to_lowercase();
            if lower_name.contains("date") || lower_name.contains("time") {
                return Ok(name.to_string());
            }
        }

        Err(ForecastError::DataError(format!(
            "No date column found in data (expected '{}')",
            preferred
        )))
    }

    /// Parse every cell of the date column; unparseable cells become `None`
    fn parse_dates(series: &Series) -> Result<Vec<Option<NaiveDate>>> {
        let as_text = series.cast(&DataType::Utf8)?;
        let dates = as_text
            .utf8()?
            .into_iter()
            .map(|cell| cell.and_then(parse_date))
            .collect();

        Ok(dates)
    }

    fn date_part(dates: &[Option<NaiveDate>], part: impl Fn(&NaiveDate) -> f64) -> Vec<f64> {
        dates
            .iter()
            .map(|date| date.as_ref().map(&part).unwrap_or(f64::NAN))
            .collect()
    }

    /// Convert a column to `f64`, mapping nulls and non-numeric cells to `NaN`
    fn series_as_f64(series: &Series) -> Result<Vec<f64>> {
        let casted = series.cast(&DataType::Float64)?;
        let values = casted
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();

        Ok(values)
    }
}

/// Parse a date in one of the formats found in exported price histories
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|datetime| datetime.date())
        })
}

impl HistoricalData {
    /// Build historical data directly from columns (for testing)
    pub fn from_columns(columns: Vec<(&str, Vec<f64>)>, target_column: &str) -> Result<Self> {
        let height = columns.first().map(|(_, values)| values.len()).unwrap_or(0);

        let mut data = HistoricalData {
            column_names: Vec::with_capacity(columns.len()),
            columns: HashMap::with_capacity(columns.len()),
            target_column: target_column.to_string(),
            height,
        };

        for (name, values) in columns {
            if values.len() != height {
                return Err(ForecastError::DataError(format!(
                    "Column '{}' has {} rows, expected {}",
                    name,
                    values.len(),
                    height
                )));
            }
            data.set_column(name, values);
        }

        Ok(data)
    }

    fn set_column(&mut self, name: &str, values: Vec<f64>) {
        if self.columns.insert(name.to_string(), values).is_none() {
            self.column_names.push(name.to_string());
        }
    }

    /// Get the column names, derived columns last
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Get a column's values
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Check whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Get one cell; `None` when the column does not exist or the row is out of range
    pub fn value(&self, name: &str, row: usize) -> Option<f64> {
        self.columns.get(name).and_then(|values| values.get(row).copied())
    }

    /// Get every column's value in one row
    pub fn row(&self, row: usize) -> Option<HashMap<String, f64>> {
        if row >= self.height {
            return None;
        }

        Some(
            self.column_names
                .iter()
                .filter_map(|name| self.value(name, row).map(|v| (name.clone(), v)))
                .collect(),
        )
    }

    /// Get the target column name
    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    /// Get the target prices, including missing entries
    pub fn target_prices(&self) -> &[f64] {
        self.column(&self.target_column).unwrap_or(&[])
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    /// Get the number of rows
    pub fn len(&self) -> usize {
        self.height
    }
}
