//! Visualization Component
//! Turns a column selection and chart kind into a `Figure`.

use rayon::prelude::*;
use thiserror::Error;

use super::figure::{pie_slices, ChartKind, Figure, PredictionKind, Series, SeriesData};
use crate::data::{DataProcessor, Dataset, ProcessorError};
use crate::stats::ForecastResult;

#[derive(Error, Debug)]
pub enum VisualizeError {
    #[error("No data loaded. Upload a CSV or Excel file first.")]
    NoDataset,
    #[error("Select at least one column to visualize.")]
    EmptySelection,
    #[error("Selected columns do not contain numeric data for visualization.")]
    NoNumericColumns,
    #[error("{0}")]
    Processor(#[from] ProcessorError),
}

/// Total width shared by grouped bars at one x position.
const BAR_GROUP_WIDTH: f64 = 0.8;

pub struct Visualizer;

impl Visualizer {
    /// Build the figure for `selection` drawn as `kind`.
    ///
    /// `Ok(None)` means nothing should be drawn: a pie chart was requested
    /// with more than one column selected.
    pub fn build(
        dataset: &Dataset,
        selection: &[String],
        kind: ChartKind,
    ) -> Result<Option<Figure>, VisualizeError> {
        if selection.is_empty() {
            return Err(VisualizeError::EmptySelection);
        }

        let numeric: Vec<&String> = selection
            .iter()
            .filter(|c| dataset.is_numeric(c))
            .collect();
        if numeric.is_empty() {
            return Err(VisualizeError::NoNumericColumns);
        }

        if kind == ChartKind::Pie {
            if selection.len() != 1 {
                log::debug!("pie chart needs exactly one column, {} selected", selection.len());
                return Ok(None);
            }
            return Self::pie(dataset, &selection[0]).map(Some);
        }

        let df = dataset.dataframe();
        let columns: Vec<(String, Vec<Option<f64>>)> = numeric
            .par_iter()
            .map(|name| {
                DataProcessor::numeric_values(df, name).map(|values| ((*name).clone(), values))
            })
            .collect::<Result<_, _>>()?;

        let group = columns.len() as f64;
        let series = columns
            .into_iter()
            .enumerate()
            .map(|(idx, (name, values))| {
                let points = || {
                    values
                        .iter()
                        .enumerate()
                        .filter_map(|(i, v)| v.filter(|v| v.is_finite()).map(|v| [i as f64, v]))
                };
                let data = match kind {
                    ChartKind::Line => SeriesData::Line(points().collect()),
                    ChartKind::Scatter => SeriesData::Points(points().collect()),
                    _ => {
                        let width = BAR_GROUP_WIDTH / group;
                        let offset = -BAR_GROUP_WIDTH / 2.0 + width * (idx as f64 + 0.5);
                        SeriesData::Bars {
                            bars: points().map(|[x, y]| [x + offset, y]).collect(),
                            width,
                        }
                    }
                };
                Series { name, data }
            })
            .collect();

        Ok(Some(Figure {
            title: "Visualization".to_string(),
            x_label: "Row".to_string(),
            y_label: "Value".to_string(),
            x_tick_labels: None,
            series,
        }))
    }

    /// Value-count pie of one column.
    fn pie(dataset: &Dataset, column: &str) -> Result<Figure, VisualizeError> {
        let counts = DataProcessor::value_counts(dataset.dataframe(), column)?;
        Ok(Figure {
            title: "Visualization".to_string(),
            x_label: String::new(),
            y_label: String::new(),
            x_tick_labels: None,
            series: vec![Series {
                name: column.to_string(),
                data: SeriesData::Pie(pie_slices(&counts)),
            }],
        })
    }

    /// Figure for a forecast: one labelled series, plus the interval band
    /// behind line charts.
    pub fn forecast_figure(result: &ForecastResult, kind: PredictionKind) -> Figure {
        let name = format!("Predicted Data for {}", result.year);
        let xy = |values: &[f64]| -> Vec<[f64; 2]> {
            values
                .iter()
                .enumerate()
                .map(|(i, v)| [i as f64, *v])
                .collect()
        };

        let mut series = Vec::new();
        match kind {
            PredictionKind::Line => {
                series.push(Series {
                    name: format!("{:.0}% interval", result.interval_level * 100.0),
                    data: SeriesData::Band {
                        lower: xy(&result.lower),
                        upper: xy(&result.upper),
                    },
                });
                series.push(Series {
                    name,
                    data: SeriesData::Line(xy(&result.values())),
                });
            }
            PredictionKind::Bar => series.push(Series {
                name,
                data: SeriesData::Bars {
                    bars: xy(&result.values()),
                    width: BAR_GROUP_WIDTH,
                },
            }),
        }

        Figure {
            title: format!("Prediction for {}", result.year),
            x_label: "Month".to_string(),
            y_label: "Value".to_string(),
            x_tick_labels: Some(result.month_labels()),
            series,
        }
    }
}
