//! Figure model for the shared canvas.
//! Plain data, independent of egui, so chart construction can be tested
//! without a UI.

use std::f64::consts::TAU;

/// Chart kinds offered by the visualize action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Scatter,
    Pie,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Scatter,
        ChartKind::Pie,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Line => "Line Plot",
            ChartKind::Bar => "Bar Plot",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Pie => "Pie Chart",
        }
    }
}

/// Chart kinds offered for the forecast curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PredictionKind {
    #[default]
    Line,
    Bar,
}

impl PredictionKind {
    pub const ALL: [PredictionKind; 2] = [PredictionKind::Line, PredictionKind::Bar];

    pub fn label(&self) -> &'static str {
        match self {
            PredictionKind::Line => "Line Plot",
            PredictionKind::Bar => "Bar Plot",
        }
    }
}

/// One pie wedge.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    /// Share of the total, in [0, 1].
    pub fraction: f64,
}

impl PieSlice {
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.fraction * 100.0)
    }
}

/// Build slices from `(label, count)` pairs.
pub fn pie_slices(counts: &[(String, usize)]) -> Vec<PieSlice> {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return Vec::new();
    }
    counts
        .iter()
        .map(|(label, count)| PieSlice {
            label: label.clone(),
            count: *count,
            fraction: *count as f64 / total as f64,
        })
        .collect()
}

/// Index of the slice under `angle` (radians, counter-clockwise from +x).
pub fn slice_at_angle(slices: &[PieSlice], angle: f64) -> Option<usize> {
    let angle = angle.rem_euclid(TAU);
    let mut start = 0.0;
    for (i, slice) in slices.iter().enumerate() {
        let end = start + slice.fraction * TAU;
        if angle >= start && angle < end {
            return Some(i);
        }
        start = end;
    }
    None
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    Line(Vec<[f64; 2]>),
    Points(Vec<[f64; 2]>),
    Bars { bars: Vec<[f64; 2]>, width: f64 },
    /// Shaded band between two curves sharing x values.
    Band { lower: Vec<[f64; 2]>, upper: Vec<[f64; 2]> },
    Pie(Vec<PieSlice>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub data: SeriesData,
}

/// What the canvas currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Category labels for integer x positions, if the x axis is categorical.
    pub x_tick_labels: Option<Vec<String>>,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn is_pie(&self) -> bool {
        self.series
            .iter()
            .any(|s| matches!(s.data, SeriesData::Pie(_)))
    }
}

/// The single shared drawing surface.
#[derive(Debug, Default)]
pub struct Canvas {
    figure: Option<Figure>,
    revision: u64,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn figure(&self) -> Option<&Figure> {
        self.figure.as_ref()
    }

    /// Replace the content and bump the revision.
    pub fn draw(&mut self, figure: Figure) {
        self.figure = Some(figure);
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        self.figure = None;
        self.revision += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.figure.is_none()
    }

    /// Changes every time the content is replaced; used to reset plot bounds.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
