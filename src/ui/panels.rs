use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::Field;
use crate::state::AppState;
use crate::ui::{heatmap, plot, table};

// ---------------------------------------------------------------------------
// Left side panel – city selector and current summary
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Select a City");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let current = state.selected_city.clone().unwrap_or_default();
    let mut chosen = None;
    egui::ComboBox::from_id_salt("city_select")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for city in &state.cities {
                if ui.selectable_label(current == *city, city).clicked() {
                    chosen = Some(city.clone());
                }
            }
        });
    if let Some(city) = chosen {
        state.select_city(city);
    }

    let Some(report) = &state.report else {
        return;
    };

    ui.add_space(8.0);
    ui.strong("Current Summary");
    ui.separator();
    match report.summary() {
        Some(summary) => {
            for (label, value) in summary.rows() {
                ui.label(RichText::new(label).small().weak());
                ui.label(RichText::new(value).size(22.0).strong());
                ui.add_space(4.0);
            }
            if let Ok(latest) = &report.latest {
                ui.label(
                    RichText::new(format!("as of {}", latest.last_updated.format("%Y-%m-%d %H:%M")))
                        .small()
                        .weak(),
                );
            }
        }
        None => {
            ui.label("No data for this city.");
        }
    }

    ui.add_space(8.0);
    ui.strong("Temperature Model");
    ui.separator();
    let regression = &report.regression;
    match (&regression.model, &regression.skipped) {
        (Some(model), _) => {
            egui::Grid::new("model_grid").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("intercept");
                ui.monospace(format!("{:+.4}", model.intercept));
                ui.end_row();
                for (field, coef) in Field::PREDICTORS.iter().zip(model.coefficients.iter()) {
                    ui.label(field.column());
                    ui.monospace(format!("{coef:+.4}"));
                    ui.end_row();
                }
            });
            ui.label(format!(
                "train {} / test {} rows",
                regression.train_len,
                regression.predicted.len()
            ));
            if let Some(m) = regression.metrics {
                let r2 = m.r2.map_or_else(|| "n/a".to_string(), |r2| format!("{r2:.3}"));
                ui.label(format!("R² {r2}   MAE {:.2}   RMSE {:.2}", m.mae, m.rmse));
            }
        }
        (None, Some(reason)) => {
            ui.label(RichText::new(reason.to_string()).weak());
        }
        (None, None) => {
            ui.label(RichText::new("No model").weak());
        }
    }
}

// ---------------------------------------------------------------------------
// Central panel – preview table and charts
// ---------------------------------------------------------------------------

/// Render the per-city report in the central panel.
pub fn report_view(ui: &mut Ui, state: &AppState) {
    let Some(report) = &state.report else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a weather file to begin  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(format!("Weather Details for {}", report.city));
            ui.label(format!("{} readings", report.row_count));
            table::preview_table(ui, &report.preview);
            ui.add_space(12.0);

            ui.heading("Actual vs Predicted Temperature");
            plot::actual_vs_predicted(ui, &report.regression, report.temperature_range);
            ui.add_space(12.0);

            ui.heading("Correlation Heatmap");
            heatmap::correlation_heatmap(ui, &report.correlation);
            ui.add_space(12.0);

            ui.heading(format!("Temperature Fluctuations in {}", report.city));
            plot::temperature_over_time(ui, &report.temperature_series);
            ui.add_space(12.0);

            ui.heading(format!("Air Quality (PM2.5 vs PM10) in {}", report.city));
            plot::air_quality_scatter(ui, &report.air_quality);
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.source.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} readings, {} cities ({} incomplete rows dropped)",
                ds.len(),
                state.cities.len(),
                ds.rows_dropped
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open weather observations")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(path);
    }
}
