//! Data Dashboard Main Application
//! Main window with control panel, table preview and chart canvas.

use crate::config::AppConfig;
use crate::controller::Controller;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, TableView};
use egui::SidePanel;

/// Main application window.
pub struct DashboardApp {
    controller: Controller,
    control_panel: ControlPanel,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        Self {
            controller: Controller::new(config),
            control_panel: ControlPanel::new(),
        }
    }

    /// Pick a CSV or Excel file and load it in the background.
    fn handle_upload(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .add_filter("Excel Files", &["xlsx"])
            .pick_file()
        else {
            return; // User cancelled
        };

        // Failures are already in the status line
        let _ = self.controller.begin_load(path);
    }

    /// Install finished loads into the panel.
    fn check_load_results(&mut self) {
        if self.controller.poll_loads() {
            self.control_panel.update_columns(self.controller.columns());
        }
    }

    fn handle_visualize(&mut self) {
        let selection = self.control_panel.selection().to_vec();
        let kind = self.control_panel.settings.chart_kind;
        let _ = self.controller.visualize(&selection, kind);
    }

    fn handle_predict(&mut self) {
        let selection = self.control_panel.selection().to_vec();
        let year = self.control_panel.settings.year.clone();
        let kind = self.control_panel.settings.prediction_kind;
        let _ = self.controller.predict(&selection, &year, kind);
    }

    /// Save the last forecast as CSV.
    fn handle_download(&mut self) {
        if self.controller.ensure_exportable().is_err() {
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name("forecast.csv")
            .save_file()
        else {
            return; // User cancelled
        };

        let _ = self.controller.export_to(&path);
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        // Request repaint while loading
        if self.controller.is_loading() {
            ctx.request_repaint();
        }

        let sidebar_width = self.controller.config().sidebar_width;

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(sidebar_width)
            .max_width(sidebar_width + 50.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(
                        ui,
                        self.controller.status(),
                        self.controller.current_path(),
                        self.controller.is_loading(),
                    );

                    match action {
                        ControlPanelAction::Upload => self.handle_upload(),
                        ControlPanelAction::Visualize => self.handle_visualize(),
                        ControlPanelAction::Predict => self.handle_predict(),
                        ControlPanelAction::Clear => self.controller.clear(),
                        ControlPanelAction::Download => self.handle_download(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - table preview above the chart canvas
        egui::CentralPanel::default().show(ctx, |ui| {
            let rows = self.controller.dataset().map(|d| d.row_count()).unwrap_or(0);
            TableView::show(ui, self.controller.preview(), rows);
            if self.controller.preview().is_some() {
                ui.add_space(8.0);
                ui.separator();
            }
            ChartViewer::show(ui, self.controller.canvas());
        });
    }
}
