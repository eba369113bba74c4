//! Data Processor Module
//! Column typing and extraction used by the chart and forecast components.

use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column '{column}' not found. Available columns are: {available}")]
    MissingColumn { column: String, available: String },
    #[error("Column '{0}' does not contain numeric data")]
    NotNumeric(String),
    #[error("Column '{column}' has value '{value}' which is not a 4-digit year")]
    InvalidYear { column: String, value: String },
}

/// Stateless helpers over a DataFrame.
pub struct DataProcessor;

impl DataProcessor {
    /// Whether a dtype counts as numeric for plotting and fitting.
    pub fn is_numeric_dtype(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    /// Whether a dtype holds free text.
    pub fn is_text_dtype(dtype: &DataType) -> bool {
        matches!(dtype, DataType::String)
    }

    /// Look up a column, listing the available ones when it is missing.
    pub fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, ProcessorError> {
        df.column(name).map_err(|_| ProcessorError::MissingColumn {
            column: name.to_string(),
            available: df
                .get_column_names()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    /// Values of a numeric column as f64, nulls preserved.
    pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, ProcessorError> {
        let column = Self::column(df, name)?;
        if !Self::is_numeric_dtype(column.dtype()) {
            return Err(ProcessorError::NotNumeric(name.to_string()));
        }

        let values = column.cast(&DataType::Float64)?;
        let ca = values.f64()?;
        Ok(ca.into_iter().collect())
    }

    /// Count occurrences of each distinct non-null value.
    ///
    /// Ordered by descending count; ties keep first-seen order.
    pub fn value_counts(df: &DataFrame, name: &str) -> Result<Vec<(String, usize)>, ProcessorError> {
        let text = Self::column(df, name)?.cast(&DataType::String)?;

        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<(String, usize)> = Vec::new();
        for value in text.str()?.iter().flatten() {
            match index.get(value) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(value, counts.len());
                    counts.push((value.to_string(), 1));
                }
            }
        }

        // Stable sort keeps first-seen order among equal counts.
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(counts)
    }

    /// Parse a text column as yearly dates. Every non-null value must be
    /// exactly four ASCII digits; the date is January 1 of that year.
    pub fn coerce_year_column(
        df: &DataFrame,
        name: &str,
    ) -> Result<Vec<Option<NaiveDate>>, ProcessorError> {
        let text = Self::column(df, name)?.cast(&DataType::String)?;

        text.str()?
            .iter()
            .map(|value| match value {
                None => Ok(None),
                Some(v) => parse_year(v)
                    .map(Some)
                    .ok_or_else(|| ProcessorError::InvalidYear {
                        column: name.to_string(),
                        value: v.to_string(),
                    }),
            })
            .collect()
    }
}

/// Strict `%Y`: four digits, nothing else.
pub fn parse_year(text: &str) -> Option<NaiveDate> {
    if text.len() != 4 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = text.parse().ok()?;
    NaiveDate::from_ymd_opt(year, 1, 1)
}

/// Display text for a single cell; nulls render empty.
pub fn cell_text(value: &AnyValue) -> String {
    if value.is_null() {
        String::new()
    } else {
        value.to_string().trim_matches('"').to_string()
    }
}
