//! Application controller.
//!
//! Owns the live dataset, the shared canvas and the last forecast, and runs
//! every user action. All methods are called from the UI thread; the only
//! other thread is the file loader, which reports back through a channel
//! polled by [`Controller::poll_loads`].

use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};
use thiserror::Error;

use crate::charts::{Canvas, ChartKind, PredictionKind, VisualizeError, Visualizer};
use crate::config::AppConfig;
use crate::data::{
    trim_column_names, DataLoader, Dataset, LoadResult, LoaderError, TableFormat, TablePreview,
};
use crate::export::{ExportError, ForecastExporter};
use crate::stats::{ForecastError, ForecastResult, Forecaster};

/// Any failure of a user action.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("{0}")]
    Loader(#[from] LoaderError),
    #[error("Failed to load {path}: {message}")]
    LoadFailed { path: String, message: String },
    #[error("{0}")]
    Visualize(#[from] VisualizeError),
    #[error("{0}")]
    Forecast(#[from] ForecastError),
    #[error("{0}")]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

/// Message shown in the status area.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub text: String,
    pub level: StatusLevel,
}

impl Status {
    fn new(text: impl Into<String>, level: StatusLevel) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new("Ready", StatusLevel::Info)
    }
}

struct PendingLoad {
    id: u64,
    path: PathBuf,
    rx: Receiver<LoadResult>,
}

pub struct Controller {
    config: AppConfig,
    forecaster: Forecaster,
    dataset: Option<Dataset>,
    preview: Option<TablePreview>,
    canvas: Canvas,
    last_forecast: Option<ForecastResult>,
    status: Status,
    pending: Option<PendingLoad>,
    next_load_id: u64,
}

impl Controller {
    pub fn new(config: AppConfig) -> Self {
        Self {
            forecaster: Forecaster::new(config.forecast.clone()),
            config,
            dataset: None,
            preview: None,
            canvas: Canvas::new(),
            last_forecast: None,
            status: Status::default(),
            pending: None,
            next_load_id: 1,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn preview(&self) -> Option<&TablePreview> {
        self.preview.as_ref()
    }

    pub fn columns(&self) -> Vec<String> {
        self.dataset.as_ref().map(|d| d.columns()).unwrap_or_default()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn last_forecast(&self) -> Option<&ForecastResult> {
        self.last_forecast.as_ref()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Path of the file being loaded, or else of the live dataset.
    pub fn current_path(&self) -> Option<&Path> {
        self.pending
            .as_ref()
            .map(|p| p.path.as_path())
            .or_else(|| self.dataset.as_ref().map(|d| d.path()))
    }

    /// Start loading `path` in the background. A load already in flight is
    /// superseded and its result will be discarded.
    pub fn begin_load(&mut self, path: PathBuf) -> Result<u64, ActionError> {
        let result = TableFormat::from_path(&path).map_err(ActionError::from);
        self.report(result)?;

        if let Some(previous) = self.pending.take() {
            log::warn!(
                "load #{} ({}) superseded by a new load",
                previous.id,
                previous.path.display()
            );
        }

        let id = self.next_load_id;
        self.next_load_id += 1;

        log::info!("load #{id}: {}", path.display());
        let rx = DataLoader::spawn(id, path.clone());
        self.pending = Some(PendingLoad { id, path, rx });
        self.status = Status::new("Loading file...", StatusLevel::Info);
        Ok(id)
    }

    /// Drain messages from the in-flight load. Returns true when a new
    /// dataset was installed.
    pub fn poll_loads(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };

        let mut finished = None;
        while finished.is_none() {
            match pending.rx.try_recv() {
                Ok(LoadResult::Progress(text)) => {
                    self.status = Status::new(text, StatusLevel::Info);
                }
                Ok(LoadResult::Complete { path, df }) => {
                    finished = Some(Ok((path, df)));
                }
                Ok(LoadResult::Error { path, message }) => {
                    finished = Some(Err(ActionError::LoadFailed {
                        path: path.display().to_string(),
                        message,
                    }));
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    finished = Some(Err(ActionError::LoadFailed {
                        path: pending.path.display().to_string(),
                        message: "loader thread exited".to_string(),
                    }));
                }
            }
        }

        match finished {
            None => {
                self.pending = Some(pending);
                false
            }
            Some(Ok((path, df))) => {
                log::info!("load #{} complete", pending.id);
                self.ingest(df, path).is_ok()
            }
            Some(Err(e)) => {
                let _ = self.report::<()>(Err(e));
                false
            }
        }
    }

    /// Block until the in-flight load finishes. Returns true when a new
    /// dataset was installed.
    #[cfg(test)]
    pub fn wait_for_load(&mut self) -> bool {
        while self.pending.is_some() {
            if self.poll_loads() {
                return true;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        false
    }

    /// Install a freshly loaded table as the live dataset.
    pub fn ingest(&mut self, mut df: DataFrame, path: PathBuf) -> Result<(), ActionError> {
        let result = trim_column_names(&mut df).map_err(ActionError::from);
        self.report(result)?;

        let dataset = Dataset::new(df, path);
        self.preview = Some(dataset.preview(self.config.preview_rows));
        self.status = Status::new(
            format!(
                "Loaded {} rows, {} columns",
                dataset.row_count(),
                dataset.column_count()
            ),
            StatusLevel::Success,
        );
        log::info!(
            "dataset {}: {} rows x {} columns",
            dataset.path().display(),
            dataset.row_count(),
            dataset.column_count()
        );

        self.dataset = Some(dataset);
        self.canvas.clear();
        self.last_forecast = None;
        Ok(())
    }

    /// Draw `selection` as `kind`. Returns whether anything was drawn.
    pub fn visualize(&mut self, selection: &[String], kind: ChartKind) -> Result<bool, ActionError> {
        let result = self.try_visualize(selection, kind);
        self.report(result)
    }

    fn try_visualize(&mut self, selection: &[String], kind: ChartKind) -> Result<bool, ActionError> {
        let dataset = self.dataset.as_ref().ok_or(VisualizeError::NoDataset)?;

        match Visualizer::build(dataset, selection, kind)? {
            Some(figure) => {
                log::info!("{} of {} series", kind.label(), figure.series.len());
                self.canvas.draw(figure);
                self.last_forecast = None;
                self.status = Status::new("Chart updated", StatusLevel::Info);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fit the seasonal model on `[time, value]` and draw the forecast.
    pub fn predict(
        &mut self,
        selection: &[String],
        year_text: &str,
        kind: PredictionKind,
    ) -> Result<(), ActionError> {
        let result = self.try_predict(selection, year_text, kind);
        self.report(result)
    }

    fn try_predict(
        &mut self,
        selection: &[String],
        year_text: &str,
        kind: PredictionKind,
    ) -> Result<(), ActionError> {
        let dataset = self.dataset.as_ref().ok_or(VisualizeError::NoDataset)?;
        let result = self
            .forecaster
            .run(dataset.dataframe(), selection, year_text)?;

        self.canvas.draw(Visualizer::forecast_figure(&result, kind));
        self.status = Status::new(
            format!(
                "Forecast ready: {} months labelled {}. The values continue the fitted series \
                 ({} observations of '{}'); the year only sets the labels. {}",
                result.len(),
                result.year,
                result.summary.n_obs,
                result.value_column,
                result.summary
            ),
            StatusLevel::Success,
        );
        self.last_forecast = Some(result);
        Ok(())
    }

    /// Clear the canvas.
    pub fn clear(&mut self) {
        self.canvas.clear();
        self.last_forecast = None;
        self.status = Status::new("Graphs cleared", StatusLevel::Info);
    }

    /// Fail early when there is nothing to export, before any dialog opens.
    pub fn ensure_exportable(&mut self) -> Result<(), ActionError> {
        let result = match self.last_forecast {
            Some(_) => Ok(()),
            None => Err(ActionError::from(ExportError::NoForecast)),
        };
        self.report(result)
    }

    /// Write the last forecast to `path`.
    pub fn export_to(&mut self, path: &Path) -> Result<(), ActionError> {
        let result = match &self.last_forecast {
            Some(forecast) => ForecastExporter::write_csv(forecast, path).map_err(ActionError::from),
            None => Err(ActionError::from(ExportError::NoForecast)),
        };
        self.report(result)?;
        self.status = Status::new(
            format!("Results saved to {}", path.display()),
            StatusLevel::Success,
        );
        Ok(())
    }

    /// Record a failed action in the status area and pass the result on.
    fn report<T>(&mut self, result: Result<T, ActionError>) -> Result<T, ActionError> {
        if let Err(e) = &result {
            let text = match e {
                ActionError::Forecast(fe) if !fe.is_validation() => {
                    format!("Prediction error: {fe}")
                }
                other => other.to_string(),
            };
            log::error!("{text}");
            self.status = Status::new(text, StatusLevel::Error);
        }
        result
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::io::Write;

    fn sales_frame(months: usize) -> DataFrame {
        let month: Vec<i64> = (1..=months as i64).collect();
        let sales: Vec<f64> = (0..months)
            .map(|t| {
                let t = t as f64;
                200.0 + 1.5 * t + 25.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin()
                    + ((t as usize * 11 + 2) % 6) as f64 * 0.5
            })
            .collect();
        let region: Vec<&str> = (0..months)
            .map(|i| if i % 3 == 0 { "east" } else { "west" })
            .collect();
        DataFrame::new(vec![
            Column::new(" month ".into(), month),
            Column::new("sales ".into(), sales),
            Column::new("region".into(), region),
        ])
        .unwrap()
    }

    fn loaded(months: usize) -> Controller {
        let mut controller = Controller::default();
        controller
            .ingest(sales_frame(months), PathBuf::from("sales.csv"))
            .unwrap();
        controller
    }

    fn select(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ingest_trims_and_previews() {
        let controller = loaded(150);
        assert_eq!(controller.columns(), vec!["month", "sales", "region"]);
        let preview = controller.preview().unwrap();
        assert_eq!(preview.rows.len(), 100);
        assert_eq!(preview.headers.len(), 3);
        assert_eq!(controller.status().level, StatusLevel::Success);
    }

    #[test]
    fn test_visualize_non_numeric_leaves_canvas() {
        let mut controller = loaded(24);
        controller
            .visualize(&select(&["sales"]), ChartKind::Line)
            .unwrap();
        let before = controller.canvas().revision();
        let figure_before = controller.canvas().figure().cloned();

        let err = controller
            .visualize(&select(&["region"]), ChartKind::Line)
            .unwrap_err();
        assert!(matches!(
            err,
            ActionError::Visualize(VisualizeError::NoNumericColumns)
        ));
        assert_eq!(controller.canvas().revision(), before);
        assert_eq!(controller.canvas().figure().cloned(), figure_before);
        assert_eq!(controller.status().level, StatusLevel::Error);
    }

    #[test]
    fn test_pie_two_columns_draws_nothing() {
        let mut controller = loaded(24);
        let drawn = controller
            .visualize(&select(&["month", "sales"]), ChartKind::Pie)
            .unwrap();
        assert!(!drawn);
        assert!(controller.canvas().is_empty());
    }

    #[test]
    fn test_visualize_without_dataset() {
        let mut controller = Controller::default();
        let err = controller
            .visualize(&select(&["a"]), ChartKind::Bar)
            .unwrap_err();
        assert!(matches!(err, ActionError::Visualize(VisualizeError::NoDataset)));
    }

    #[test]
    fn test_predict_three_points_reports_error() {
        let mut controller = loaded(3);
        let err = controller
            .predict(&select(&["month", "sales"]), "2024", PredictionKind::Line)
            .unwrap_err();
        assert!(matches!(err, ActionError::Forecast(_)));
        assert!(controller.status().text.starts_with("Prediction error:"));
        assert!(controller.canvas().is_empty());
        assert!(controller.last_forecast().is_none());
    }

    #[test]
    fn test_predict_then_export() {
        let mut controller = loaded(60);
        controller
            .predict(&select(&["month", "sales"]), "2026", PredictionKind::Bar)
            .unwrap();
        let values = controller.last_forecast().unwrap().values();
        assert_eq!(values.len(), 12);
        assert!(!controller.canvas().is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        controller.export_to(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Predicted Sales");
        assert_eq!(lines.len(), 13);
        assert!(lines[1].starts_with("2026-01-31,"));
        for (line, expected) in lines[1..].iter().zip(&values) {
            let parsed: f64 = line.split(',').nth(1).unwrap().parse().unwrap();
            assert!((parsed - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }
    }

    #[test]
    fn test_export_without_forecast() {
        let mut controller = loaded(24);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        assert!(controller.ensure_exportable().is_err());
        let err = controller.export_to(&path).unwrap_err();
        assert!(matches!(err, ActionError::Export(ExportError::NoForecast)));
        assert!(!path.exists());
    }

    #[test]
    fn test_later_actions_invalidate_forecast() {
        let mut controller = loaded(48);
        controller
            .predict(&select(&["month", "sales"]), "2024", PredictionKind::Line)
            .unwrap();
        assert!(controller.last_forecast().is_some());

        controller
            .visualize(&select(&["sales"]), ChartKind::Scatter)
            .unwrap();
        assert!(controller.last_forecast().is_none());

        controller
            .predict(&select(&["month", "sales"]), "2024", PredictionKind::Line)
            .unwrap();
        controller.clear();
        assert!(controller.last_forecast().is_none());
        assert!(controller.canvas().is_empty());
    }

    #[test]
    fn test_background_load_and_stale_discard() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        writeln!(std::fs::File::create(&first).unwrap(), " A ,B \n1,2").unwrap();
        writeln!(std::fs::File::create(&second).unwrap(), "x,y,z\n1,2,3").unwrap();

        let mut controller = Controller::default();
        controller.begin_load(first).unwrap();
        controller.begin_load(second.clone()).unwrap();
        assert!(controller.wait_for_load());

        assert_eq!(controller.columns(), vec!["x", "y", "z"]);
        assert_eq!(controller.current_path(), Some(second.as_path()));
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_load_csv_header_trim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ab.csv");
        writeln!(std::fs::File::create(&path).unwrap(), " A ,B \n1,2\n3,4").unwrap();

        let mut controller = Controller::default();
        controller.begin_load(path).unwrap();
        assert!(controller.wait_for_load());
        assert_eq!(controller.columns(), vec!["A", "B"]);
    }

    #[test]
    fn test_load_failure_is_reported() {
        let mut controller = Controller::default();
        controller
            .begin_load(PathBuf::from("/nonexistent/sales.csv"))
            .unwrap();
        assert!(!controller.wait_for_load());
        assert!(controller.dataset().is_none());
        assert_eq!(controller.status().level, StatusLevel::Error);
        assert!(controller.status().text.contains("sales.csv"));
    }

    #[test]
    fn test_loader_exit_without_result_is_reported() {
        let mut controller = Controller::default();
        let (tx, rx) = std::sync::mpsc::channel();
        controller.pending = Some(PendingLoad {
            id: 7,
            path: PathBuf::from("gone.csv"),
            rx,
        });
        tx.send(LoadResult::Progress("Reading gone.csv...".to_string()))
            .unwrap();
        drop(tx);

        assert!(!controller.poll_loads());
        assert!(!controller.is_loading());
        assert!(!controller.wait_for_load());
        assert_eq!(controller.status().level, StatusLevel::Error);
        assert!(controller.status().text.contains("gone.csv"));
        assert!(controller.status().text.contains("loader thread exited"));
    }

    #[test]
    fn test_ingest_rejects_duplicate_after_trim() {
        let df = DataFrame::new(vec![
            Column::new("A".into(), vec![1i64]),
            Column::new(" A".into(), vec![2i64]),
        ])
        .unwrap();
        let mut controller = Controller::default();
        let err = controller.ingest(df, PathBuf::from("dup.csv")).unwrap_err();
        assert!(matches!(
            err,
            ActionError::Loader(LoaderError::DuplicateColumn(_))
        ));
        assert!(controller.dataset().is_none());
    }

    #[test]
    fn test_unsupported_extension_rejected_up_front() {
        let mut controller = Controller::default();
        let err = controller
            .begin_load(PathBuf::from("notes.txt"))
            .unwrap_err();
        assert!(matches!(
            err,
            ActionError::Loader(LoaderError::UnsupportedExtension(_))
        ));
        assert!(!controller.is_loading());
    }
}
