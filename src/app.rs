use eframe::egui;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct WeatherDashboardApp {
    pub state: AppState,
}

impl WeatherDashboardApp {
    /// Create the app and load the configured data file.
    pub fn new(config: AppConfig) -> Self {
        let path = config.data_path.clone();
        let mut state = AppState::new(config);
        state.load_path(path);
        Self { state }
    }
}

impl eframe::App for WeatherDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: city selector + current summary ----
        egui::SidePanel::left("city_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: table and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::report_view(ui, &self.state);
        });
    }
}
