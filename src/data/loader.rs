//! Table Loader Module
//! Reads CSV (Polars) and XLSX (calamine) files into a DataFrame, on a
//! background thread when driven from the GUI.

use anyhow::Context;
use polars::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use thiserror::Error;

use super::xlsx;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Unsupported file type '{0}' (expected .csv or .xlsx)")]
    UnsupportedExtension(String),
    #[error("Failed to load table: {0}")]
    Polars(#[from] PolarsError),
    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),
    #[error("Spreadsheet has no worksheet")]
    NoWorksheet,
    #[error("Spreadsheet has no header row")]
    EmptySheet,
    #[error("Duplicate column name after trimming: '{0}'")]
    DuplicateColumn(String),
}

/// Recognized input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, LoaderError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "xlsx" => Ok(TableFormat::Xlsx),
            _ => Err(LoaderError::UnsupportedExtension(
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            )),
        }
    }
}

/// Messages sent from a loading thread back to the UI thread.
pub enum LoadResult {
    Progress(String),
    Complete { path: PathBuf, df: DataFrame },
    Error { path: PathBuf, message: String },
}

/// Reads tabular files.
pub struct DataLoader;

impl DataLoader {
    /// Load a file fully, dispatching on its extension.
    pub fn load_file(path: &Path) -> Result<DataFrame, LoaderError> {
        match TableFormat::from_path(path)? {
            TableFormat::Csv => Self::load_csv(path),
            TableFormat::Xlsx => xlsx::load_xlsx(path),
        }
    }

    /// Load a CSV file using Polars.
    pub fn load_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        let path_str = path.to_string_lossy().to_string();

        let df = LazyCsvReader::new(&path_str)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_rechunk(true)
            .finish()?
            .collect()?;

        Ok(df)
    }

    /// Load `path` on a new thread. The returned receiver yields progress
    /// and exactly one terminal `Complete` or `Error` message. Dropping the
    /// receiver discards the result.
    pub fn spawn(load_id: u64, path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = channel();

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress(format!(
                "Reading {}...",
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default()
            )));

            let result = Self::load_file(&path)
                .with_context(|| format!("loading {}", path.display()));

            let message = match result {
                Ok(df) => {
                    log::debug!("load #{load_id}: parsed {} rows", df.height());
                    LoadResult::Complete { path, df }
                }
                Err(e) => LoadResult::Error {
                    path,
                    message: format!("{e:#}"),
                },
            };

            if tx.send(message).is_err() {
                log::warn!("load #{load_id}: superseded by a newer load, result discarded");
            }
        });

        rx
    }
}

/// Strip leading/trailing whitespace from every column name.
pub fn trim_column_names(df: &mut DataFrame) -> Result<(), LoaderError> {
    let trimmed: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.trim().to_string())
        .collect();

    let mut seen = HashSet::new();
    for name in &trimmed {
        if !seen.insert(name.as_str()) {
            return Err(LoaderError::DuplicateColumn(name.clone()));
        }
    }

    df.set_column_names(trimmed.iter().map(|s| s.as_str()))?;
    Ok(())
}
