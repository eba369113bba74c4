//! Forecast CSV export.
//! Writes the most recent forecast as `Date,Predicted Sales`.

use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

use crate::stats::ForecastResult;

pub const DATE_HEADER: &str = "Date";
pub const VALUE_HEADER: &str = "Predicted Sales";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No forecast to export. Run a prediction first.")]
    NoForecast,
    #[error("Failed to create {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write CSV: {0}")]
    Polars(#[from] PolarsError),
}

/// Serializes forecasts with Polars.
pub struct ForecastExporter;

impl ForecastExporter {
    /// Two columns: ISO dates and predicted values.
    pub fn to_dataframe(result: &ForecastResult) -> Result<DataFrame, ExportError> {
        let dates: Vec<String> = result
            .points
            .iter()
            .map(|p| p.date.format("%Y-%m-%d").to_string())
            .collect();
        let values = result.values();

        Ok(DataFrame::new(vec![
            Column::new(DATE_HEADER.into(), dates),
            Column::new(VALUE_HEADER.into(), values),
        ])?)
    }

    pub fn write_csv(result: &ForecastResult, path: &Path) -> Result<(), ExportError> {
        let mut df = Self::to_dataframe(result)?;
        let mut file = File::create(path).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;

        log::info!("exported {} forecast rows to {}", df.height(), path.display());
        Ok(())
    }
}
