#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use dispatch_timeline::app::DispatchApp;
use dispatch_timeline::config::AppConfig;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::load_or_default();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Dispatch Timeline"),
        ..Default::default()
    };

    eframe::run_native(
        "Dispatch Timeline",
        options,
        Box::new(|cc| Ok(Box::new(DispatchApp::new(cc, config)?))),
    )
}
