mod analysis;
mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use app::WeatherDashboardApp;
use config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::from_env();
    log::info!(
        "Data file {}, split seed {}, test fraction {}",
        config.data_path.display(),
        config.split.seed,
        config.split.test_fraction
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Indian Cities Weather Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(WeatherDashboardApp::new(config)))),
    )
}
