use std::path::Path;

use eframe::egui;
use ringwatch::app::RingwatchApp;

/// Manifest picked up automatically when present in the working directory.
const DEFAULT_SOURCES: &str = "ring_sources.json";

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Ringwatch – CO₂ Monitoring",
        options,
        Box::new(|_cc| {
            let sources = Path::new(DEFAULT_SOURCES);
            let app = if sources.exists() {
                RingwatchApp::with_sources(sources)
            } else {
                RingwatchApp::default()
            };
            Ok(Box::new(app))
        }),
    )
}
