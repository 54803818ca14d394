use eframe::egui::{Align, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{COL_CITY, COL_TIMESTAMP, Field, WeatherRecord};

const ROW_HEIGHT: f32 = 18.0;

/// Preview of the first records of the selected city.
pub fn preview_table(ui: &mut Ui, rows: &[WeatherRecord]) {
    if rows.is_empty() {
        ui.label(RichText::new("No readings for this city.").weak());
        return;
    }

    let header: Vec<&str> = [COL_CITY, COL_TIMESTAMP]
        .into_iter()
        .chain(Field::ALL.iter().map(|f| f.column()))
        .collect();

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(64.0), header.len())
        .header(ROW_HEIGHT + 4.0, |mut row| {
            for name in &header {
                row.col(|ui| {
                    ui.strong(*name);
                });
            }
        })
        .body(|mut body| {
            for record in rows {
                body.row(ROW_HEIGHT, |mut row| {
                    row.col(|ui| {
                        ui.label(&record.location_name);
                    });
                    row.col(|ui| {
                        ui.label(record.last_updated.format("%Y-%m-%d %H:%M").to_string());
                    });
                    for field in Field::ALL {
                        row.col(|ui| {
                            ui.label(format!("{}", field.value_of(record)));
                        });
                    }
                });
            }
        });
}
