//! GUI entry point for SatScan

mod app;

use app::SatScanApp;
use eframe::egui;

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SatScan - Satellite Object Detection",
        options,
        Box::new(|cc| Ok(Box::new(SatScanApp::new(cc)))),
    )
}
