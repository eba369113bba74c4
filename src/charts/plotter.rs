//! Chart Plotter Module
//! Draws a `Figure` interactively using egui_plot, with hover read-outs.

use super::figure::{slice_at_angle, Figure, PieSlice, SeriesData};
use egui::{Color32, RichText, Stroke};
use egui_plot::{
    Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text,
};
use std::f64::consts::TAU;

/// Forecast curve colour
pub const FORECAST_COLOR: Color32 = Color32::from_rgb(255, 165, 0); // Orange

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(31, 119, 180),  // Blue
    Color32::from_rgb(255, 127, 14),  // Orange
    Color32::from_rgb(44, 160, 44),   // Green
    Color32::from_rgb(214, 39, 40),   // Red
    Color32::from_rgb(148, 103, 189), // Purple
    Color32::from_rgb(140, 86, 75),   // Brown
    Color32::from_rgb(227, 119, 194), // Pink
    Color32::from_rgb(127, 127, 127), // Grey
    Color32::from_rgb(188, 189, 34),  // Olive
    Color32::from_rgb(23, 190, 207),  // Cyan
];

/// Segments used for a full circle.
const PIE_RESOLUTION: f64 = 128.0;

/// Draws figures using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for the n-th series.
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Draw any figure. `revision` keys the plot so new content gets fresh bounds.
    pub fn draw_figure(ui: &mut egui::Ui, figure: &Figure, revision: u64) {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(&figure.title).size(18.0).strong());
        });
        ui.add_space(6.0);

        if figure.is_pie() {
            Self::draw_pie(ui, figure, revision);
        } else {
            Self::draw_xy(ui, figure, revision);
        }
    }

    /// Line, bar and scatter series over a shared x axis.
    fn draw_xy(ui: &mut egui::Ui, figure: &Figure, revision: u64) {
        let tick_labels = figure.x_tick_labels.clone();
        let hover_labels = figure.x_tick_labels.clone();
        let forecast = tick_labels.is_some();

        let mut plot = Plot::new(format!("canvas_{revision}"))
            .legend(Legend::default())
            .x_axis_label(figure.x_label.clone())
            .y_axis_label(figure.y_label.clone())
            .allow_boxed_zoom(true)
            .label_formatter(move |name, value| {
                let x = match &hover_labels {
                    Some(labels) => {
                        let idx = value.x.round();
                        if idx >= 0.0 && (idx as usize) < labels.len() {
                            labels[idx as usize].clone()
                        } else {
                            String::new()
                        }
                    }
                    None => format!("row {:.0}", value.x),
                };
                if name.is_empty() {
                    format!("{x}\n{:.3}", value.y)
                } else {
                    format!("{name}\n{x}: {:.3}", value.y)
                }
            });

        if let Some(labels) = tick_labels {
            plot = plot.x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                let on_tick = (mark.value - idx).abs() < 1e-6;
                if on_tick && idx >= 0.0 && (idx as usize) < labels.len() {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            });
        }

        plot.show(ui, |plot_ui| {
            for (i, series) in figure.series.iter().enumerate() {
                let color = if forecast {
                    FORECAST_COLOR
                } else {
                    Self::series_color(i)
                };

                match &series.data {
                    SeriesData::Line(points) => {
                        plot_ui.line(
                            Line::new(PlotPoints::from(points.clone()))
                                .name(&series.name)
                                .color(color)
                                .width(2.0),
                        );
                        // Markers make single points hoverable
                        plot_ui.points(
                            Points::new(PlotPoints::from(points.clone()))
                                .name(&series.name)
                                .color(color)
                                .radius(2.5),
                        );
                    }
                    SeriesData::Points(points) => {
                        plot_ui.points(
                            Points::new(PlotPoints::from(points.clone()))
                                .name(&series.name)
                                .color(color)
                                .radius(3.5),
                        );
                    }
                    SeriesData::Bars { bars, width } => {
                        let bars: Vec<Bar> = bars
                            .iter()
                            .map(|[x, y]| Bar::new(*x, *y).width(*width))
                            .collect();
                        plot_ui.bar_chart(BarChart::new(bars).name(&series.name).color(color));
                    }
                    SeriesData::Band { lower, upper } => {
                        let mut outline = lower.clone();
                        outline.extend(upper.iter().rev());
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::from(outline))
                                .name(&series.name)
                                .fill_color(FORECAST_COLOR.gamma_multiply(0.2))
                                .stroke(Stroke::NONE),
                        );
                    }
                    SeriesData::Pie(_) => {}
                }
            }
        });
    }

    /// Pie of a single series, drawn as polygons on an equal-aspect plot.
    fn draw_pie(ui: &mut egui::Ui, figure: &Figure, revision: u64) {
        let Some(slices) = figure.series.iter().find_map(|s| match &s.data {
            SeriesData::Pie(slices) => Some(slices.clone()),
            _ => None,
        }) else {
            return;
        };

        let response = Plot::new(format!("canvas_{revision}"))
            .legend(Legend::default())
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .show_x(false)
            .show_y(false)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .include_x(-1.5)
            .include_x(1.5)
            .include_y(-1.3)
            .include_y(1.3)
            .show(ui, |plot_ui| {
                let mut start = 0.0;
                for (i, slice) in slices.iter().enumerate() {
                    let sweep = slice.fraction * TAU;
                    let color = Self::series_color(i);

                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(Self::wedge(start, sweep)))
                            .name(&slice.label)
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );

                    let mid = start + sweep / 2.0;
                    plot_ui.text(Text::new(
                        PlotPoint::new(0.6 * mid.cos(), 0.6 * mid.sin()),
                        RichText::new(slice.percent_label()).color(Color32::WHITE),
                    ));
                    plot_ui.text(Text::new(
                        PlotPoint::new(1.15 * mid.cos(), 1.15 * mid.sin()),
                        slice.label.clone(),
                    ));

                    start += sweep;
                }
                plot_ui.pointer_coordinate()
            });

        if let Some(pointer) = response.inner {
            if let Some(text) = Self::pie_hover(&slices, pointer) {
                let _ = response.response.on_hover_text(text);
            }
        }
    }

    /// Tooltip text for the slice under `pointer`, if any.
    fn pie_hover(slices: &[PieSlice], pointer: PlotPoint) -> Option<String> {
        if pointer.x.hypot(pointer.y) > 1.0 {
            return None;
        }
        let idx = slice_at_angle(slices, pointer.y.atan2(pointer.x))?;
        let slice = &slices[idx];
        Some(format!(
            "{}: {} ({})",
            slice.label,
            slice.count,
            slice.percent_label()
        ))
    }

    /// Closed outline of a wedge from `start` sweeping `sweep` radians.
    fn wedge(start: f64, sweep: f64) -> Vec<[f64; 2]> {
        let steps = ((sweep / TAU) * PIE_RESOLUTION).ceil().max(2.0) as usize;
        let mut points = Vec::with_capacity(steps + 2);
        points.push([0.0, 0.0]);
        for k in 0..=steps {
            let a = start + sweep * k as f64 / steps as f64;
            points.push([a.cos(), a.sin()]);
        }
        points
    }
}
