//! Malaysia CPI Dashboard
//!
//! A Rust application for exploring Malaysian Consumer Price Index data
//! with interactive charts, powered by OpenDOSM.

mod charts;
mod data;
mod gui;
mod stats;

use eframe::egui;
use gui::DashboardApp;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Malaysia CPI Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Malaysia CPI Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc)))),
    )
}
