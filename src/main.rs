//! Data Dashboard - CSV/Excel Visualization & Seasonal Forecasting
//!
//! A Rust application for previewing tabular data, charting its columns and
//! forecasting a year of monthly values.

mod charts;
mod config;
mod controller;
mod data;
mod export;
mod gui;
mod stats;

use config::AppConfig;
use eframe::egui;
use env_logger::Env;
use gui::DashboardApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::default();
    log::info!("starting {}", config.title);

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size)
            .with_title(&config.title),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
}
