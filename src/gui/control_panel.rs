//! Control Panel Widget
//! Left side panel with file upload, column selection, chart settings and actions.

use crate::charts::{ChartKind, PredictionKind};
use crate::controller::{Status, StatusLevel};
use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::path::Path;

/// User settings for visualization and prediction
#[derive(Default, Clone)]
pub struct UserSettings {
    pub chart_kind: ChartKind,
    pub prediction_kind: PredictionKind,
    pub year: String,
}

/// Left side control panel.
#[derive(Default)]
pub struct ControlPanel {
    pub settings: UserSettings,
    pub columns: Vec<String>,
    /// Selected columns in the order the user picked them.
    selection: Vec<String>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the column list after a dataset load. Clears the selection.
    pub fn update_columns(&mut self, columns: Vec<String>) {
        self.columns = columns;
        self.selection.clear();
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Select or deselect `column`, keeping pick order.
    pub fn toggle(&mut self, column: &str) {
        if let Some(pos) = self.selection.iter().position(|c| c == column) {
            self.selection.remove(pos);
        } else if self.columns.iter().any(|c| c == column) {
            self.selection.push(column.to_string());
        }
    }

    /// Draw the control panel
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        status: &Status,
        current_file: Option<&Path>,
        loading: bool,
    ) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;
        let has_data = !self.columns.is_empty();

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Data Dashboard")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Visualization & Prediction")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = current_file
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if current_file.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Upload CSV/Excel").clicked() {
                            action = ControlPanelAction::Upload;
                        }
                    });
                });
                if loading {
                    ui.add(egui::Spinner::new());
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Column Selection Section =====
        ui.label(RichText::new("🔧 Columns").size(14.0).strong());
        ui.add_space(5.0);

        let mut toggled = None;
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical().max_height(160.0).show(ui, |ui| {
                    if self.columns.is_empty() {
                        ui.label(RichText::new("Upload a file to list columns").color(Color32::GRAY));
                    }
                    for col in &self.columns {
                        let order = self.selection.iter().position(|c| c == col);
                        let mut checked = order.is_some();
                        let text = match order {
                            Some(i) => format!("{col}  ({})", i + 1),
                            None => col.clone(),
                        };
                        if ui.checkbox(&mut checked, text).changed() {
                            toggled = Some(col.clone());
                        }
                    }
                });
            });
        if let Some(col) = toggled {
            self.toggle(&col);
        }

        ui.add_space(5.0);
        if ui.small_button("Clear Selection").clicked() {
            self.selection.clear();
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Chart Settings Section =====
        ui.label(RichText::new("⚙️ Charts").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 110.0;
        let combo_width = 150.0;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Visualization:"));
            ComboBox::from_id_salt("chart_kind")
                .width(combo_width)
                .selected_text(self.settings.chart_kind.label())
                .show_ui(ui, |ui| {
                    for kind in ChartKind::ALL {
                        ui.selectable_value(&mut self.settings.chart_kind, kind, kind.label());
                    }
                });
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Prediction:"));
            ComboBox::from_id_salt("prediction_kind")
                .width(combo_width)
                .selected_text(self.settings.prediction_kind.label())
                .show_ui(ui, |ui| {
                    for kind in PredictionKind::ALL {
                        ui.selectable_value(&mut self.settings.prediction_kind, kind, kind.label());
                    }
                });
        });

        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Forecast Year:"));
            ui.add(
                egui::TextEdit::singleline(&mut self.settings.year)
                    .hint_text("e.g., 2024")
                    .desired_width(combo_width),
            );
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(has_data && !loading, |ui| {
                let button = egui::Button::new(RichText::new("▶ Visualize Data").size(15.0))
                    .min_size(egui::vec2(200.0, 32.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Visualize;
                }

                ui.add_space(6.0);

                let button =
                    egui::Button::new(RichText::new("📈 Predict Future Values").size(15.0))
                        .min_size(egui::vec2(200.0, 32.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Predict;
                }
            });

            ui.add_space(6.0);

            let button = egui::Button::new(RichText::new("🗑 Clear Graphs").size(14.0))
                .min_size(egui::vec2(150.0, 28.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::Clear;
            }

            ui.add_space(6.0);

            let button = egui::Button::new(RichText::new("💾 Download Results").size(14.0))
                .min_size(egui::vec2(150.0, 28.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::Download;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("ℹ Status").size(14.0).strong());
        ui.add_space(5.0);

        let status_color = match status.level {
            StatusLevel::Error => Color32::from_rgb(220, 53, 69),
            StatusLevel::Success => Color32::from_rgb(40, 167, 69),
            StatusLevel::Info => Color32::GRAY,
        };
        ui.label(RichText::new(&status.text).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    Upload,
    Visualize,
    Predict,
    Clear,
    Download,
}
