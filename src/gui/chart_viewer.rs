//! Chart Viewer Widget
//! Central area showing the shared canvas.

use crate::charts::{Canvas, ChartPlotter};
use egui::{Color32, RichText};

/// Height reserved for the chart card.
const CARD_MIN_HEIGHT: f32 = 360.0;

pub struct ChartViewer;

impl ChartViewer {
    /// Draw the canvas, or a placeholder when nothing is drawn.
    pub fn show(ui: &mut egui::Ui, canvas: &Canvas) {
        let Some(figure) = canvas.figure() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0).color(Color32::GRAY));
            });
            return;
        };

        let height = ui.available_height().max(CARD_MIN_HEIGHT);
        egui::Frame::none()
            .rounding(8.0)
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_min_height(height - 24.0);
                ChartPlotter::draw_figure(ui, figure, canvas.revision());
            });
    }
}
