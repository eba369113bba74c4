//! Table View Widget
//! Scrollable grid of the first rows of the loaded dataset.

use crate::data::TablePreview;
use egui::{RichText, ScrollArea};

const TABLE_HEIGHT: f32 = 200.0;

pub struct TableView;

impl TableView {
    pub fn show(ui: &mut egui::Ui, preview: Option<&TablePreview>, total_rows: usize) {
        let Some(preview) = preview else {
            return;
        };

        ui.label(
            RichText::new(format!(
                "Preview: {} of {} rows",
                preview.rows.len(),
                total_rows
            ))
            .size(12.0)
            .strong(),
        );
        ui.add_space(4.0);

        ScrollArea::both()
            .id_salt("table_preview")
            .max_height(TABLE_HEIGHT)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                egui::Grid::new("table_grid")
                    .striped(true)
                    .min_col_width(60.0)
                    .show(ui, |ui| {
                        for header in &preview.headers {
                            ui.label(RichText::new(header).strong());
                        }
                        ui.end_row();

                        for row in &preview.rows {
                            for cell in row {
                                ui.label(cell);
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
