//! The live dataset and its table preview.

use polars::prelude::*;
use std::path::{Path, PathBuf};

use super::processor::{cell_text, DataProcessor};

/// Header plus stringified rows, ready for the table widget.
#[derive(Debug, Clone, Default)]
pub struct TablePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A loaded table. Replaced wholesale on every successful load.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
    path: PathBuf,
}

impl Dataset {
    pub fn new(df: DataFrame, path: PathBuf) -> Self {
        Self { df, path }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Column names in file order.
    pub fn columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.df
            .column(name)
            .map(|c| DataProcessor::is_numeric_dtype(c.dtype()))
            .unwrap_or(false)
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn column_count(&self) -> usize {
        self.df.width()
    }

    /// First `max_rows` rows, all columns.
    pub fn preview(&self, max_rows: usize) -> TablePreview {
        let n = max_rows.min(self.df.height());
        let columns = self.df.get_columns();

        let rows = (0..n)
            .map(|i| {
                columns
                    .iter()
                    .map(|c| c.get(i).map(|v| cell_text(&v)).unwrap_or_default())
                    .collect()
            })
            .collect();

        TablePreview {
            headers: self.columns(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(rows: usize) -> Dataset {
        let idx: Vec<i64> = (0..rows as i64).collect();
        let names: Vec<String> = (0..rows).map(|i| format!("row {i}")).collect();
        let df = DataFrame::new(vec![
            Column::new("idx".into(), idx),
            Column::new("name".into(), names),
        ])
        .unwrap();
        Dataset::new(df, PathBuf::from("memory.csv"))
    }

    #[test]
    fn test_preview_is_capped() {
        let ds = dataset(250);
        let preview = ds.preview(100);
        assert_eq!(preview.rows.len(), 100);
        assert_eq!(preview.headers, vec!["idx", "name"]);
        assert_eq!(preview.rows[3], vec!["3".to_string(), "row 3".to_string()]);
    }

    #[test]
    fn test_preview_short_table() {
        let ds = dataset(5);
        assert_eq!(ds.preview(100).rows.len(), 5);
    }

    #[test]
    fn test_is_numeric() {
        let ds = dataset(2);
        assert!(ds.is_numeric("idx"));
        assert!(!ds.is_numeric("name"));
        assert!(!ds.is_numeric("missing"));
    }
}
