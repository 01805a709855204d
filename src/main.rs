//! Strideboard - Personal Activity Dashboard
//!
//! A Rust application for exploring exported workout logs interactively.

use eframe::egui;
use strideboard::gui::DashboardApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Strideboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Strideboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc)))),
    )
}
