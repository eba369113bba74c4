//! Charts module - canvas model, chart construction and rendering

mod figure;
mod plotter;
mod visualize;

pub use figure::{Canvas, ChartKind, PredictionKind};
pub use plotter::ChartPlotter;
pub use visualize::{VisualizeError, Visualizer};
