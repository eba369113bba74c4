//! Forecasting Component
//! Validates a `[time, value]` column pair and a target year, fits the
//! seasonal model on the value column and labels the forecast by month.

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;

use super::optimizer::NelderMeadConfig;
use super::sarima::{ModelSummary, Sarima, SarimaError};
use crate::config::ForecastConfig;
use crate::data::{DataProcessor, ProcessorError};

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Select exactly two columns (time, value) for prediction; {0} selected.")]
    SelectionSize(usize),
    #[error("Invalid column selection. {0}")]
    Column(#[from] ProcessorError),
    #[error("Time column '{0}' must be numeric or contain 4-digit years.")]
    TimeColumn(String),
    #[error("Value column '{0}' must contain numeric data for prediction.")]
    ValueColumn(String),
    #[error("Please enter a valid year (got '{0}').")]
    InvalidYear(String),
    #[error("Year {0} cannot be represented as a date.")]
    YearOutOfRange(i32),
    #[error("{0}")]
    Model(#[from] SarimaError),
}

impl ForecastError {
    /// True for input problems, false for failures inside the model.
    pub fn is_validation(&self) -> bool {
        !matches!(self, ForecastError::Model(_))
    }
}

/// A single forecast period.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// The output of one predict action.
#[derive(Debug, Clone)]
pub struct ForecastResult {
    /// Year used to label the forecast.
    pub year: i32,
    pub time_column: String,
    pub value_column: String,
    pub points: Vec<ForecastPoint>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub interval_level: f64,
    pub summary: ModelSummary,
}

impl ForecastResult {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `YYYY-MM` tick labels.
    pub fn month_labels(&self) -> Vec<String> {
        self.points
            .iter()
            .map(|p| p.date.format("%Y-%m").to_string())
            .collect()
    }
}

/// Runs validation, fitting and labelling.
pub struct Forecaster {
    config: ForecastConfig,
}

impl Forecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// Parse the free-text year field. Surrounding whitespace is ignored;
    /// no range check beyond what date construction needs.
    pub fn parse_year(text: &str) -> Result<i32, ForecastError> {
        text.trim()
            .parse::<i32>()
            .map_err(|_| ForecastError::InvalidYear(text.to_string()))
    }

    /// `count` month-end dates starting with January of `year`.
    pub fn month_end_dates(year: i32, count: usize) -> Result<Vec<NaiveDate>, ForecastError> {
        (0..count)
            .map(|i| {
                let y = year.checked_add((i / 12) as i32)?;
                let m = (i % 12) as u32 + 1;
                let next_month = if m == 12 {
                    NaiveDate::from_ymd_opt(y.checked_add(1)?, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(y, m + 1, 1)
                };
                next_month?.pred_opt()
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(ForecastError::YearOutOfRange(year))
    }

    /// Check the `[time, value]` pair and return the value series.
    pub fn validate_columns(
        df: &DataFrame,
        selection: &[String],
    ) -> Result<(String, String, Vec<f64>), ForecastError> {
        let [time_col, value_col] = selection else {
            return Err(ForecastError::SelectionSize(selection.len()));
        };

        let time = DataProcessor::column(df, time_col)?;
        let value = DataProcessor::column(df, value_col)?;

        let time_dtype = time.dtype();
        if DataProcessor::is_text_dtype(time_dtype) {
            // Yearly labels only need to parse; the fit uses the value column alone.
            DataProcessor::coerce_year_column(df, time_col)?;
        } else if !DataProcessor::is_numeric_dtype(time_dtype)
            && !matches!(time_dtype, DataType::Date | DataType::Datetime(_, _))
        {
            return Err(ForecastError::TimeColumn(time_col.clone()));
        }

        if !DataProcessor::is_numeric_dtype(value.dtype()) {
            return Err(ForecastError::ValueColumn(value_col.clone()));
        }

        let raw = DataProcessor::numeric_values(df, value_col)?;
        let values: Vec<f64> = raw.iter().flatten().copied().filter(|v| v.is_finite()).collect();
        if values.len() < raw.len() {
            log::warn!(
                "dropped {} null or non-finite values from '{value_col}'",
                raw.len() - values.len()
            );
        }

        Ok((time_col.clone(), value_col.clone(), values))
    }

    /// Validate, fit and forecast `horizon` periods.
    ///
    /// The forecast continues from the end of the fitted series; `year_text`
    /// only sets the month labels.
    pub fn run(
        &self,
        df: &DataFrame,
        selection: &[String],
        year_text: &str,
    ) -> Result<ForecastResult, ForecastError> {
        let (time_column, value_column, values) = Self::validate_columns(df, selection)?;
        let year = Self::parse_year(year_text)?;
        let dates = Self::month_end_dates(year, self.config.horizon)?;

        let optimizer = NelderMeadConfig {
            max_iter: self.config.max_iterations,
            tolerance: self.config.tolerance,
            ..Default::default()
        };
        let mut model = Sarima::new(self.config.order).with_optimizer(optimizer);
        model.fit(&values)?;

        let (mean, lower, upper) =
            model.predict_intervals(self.config.horizon, self.config.interval_level)?;
        let summary = model.summary().cloned().ok_or(SarimaError::NotFitted)?;

        log::info!(
            "forecast '{value_column}' ({} obs) labelled {year}: {summary}",
            values.len()
        );

        let points = dates
            .into_iter()
            .zip(mean)
            .map(|(date, value)| ForecastPoint { date, value })
            .collect();

        Ok(ForecastResult {
            year,
            time_column,
            value_column,
            points,
            lower,
            upper,
            interval_level: self.config.interval_level,
            summary,
        })
    }
}
