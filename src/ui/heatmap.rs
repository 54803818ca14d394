use eframe::egui::{self, Align2, Color32, FontId, RichText, Sense, Ui, Vec2};

use crate::analysis::correlation::CorrelationMatrix;
use crate::color;

const CELL: Vec2 = Vec2::new(92.0, 32.0);

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Annotated grid of coefficients, coloured on a diverging scale.
pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let fields = matrix.fields();

    egui::Grid::new("correlation_heatmap")
        .spacing([2.0, 2.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for field in fields {
                ui.label(RichText::new(field.label()).small());
            }
            ui.end_row();

            for (i, row_field) in fields.iter().enumerate() {
                ui.label(RichText::new(row_field.label()).small());
                for (j, col_field) in fields.iter().enumerate() {
                    let (rect, response) = ui.allocate_exact_size(CELL, Sense::hover());

                    let (fill, text) = if i == j || matrix.is_defined(i, j) {
                        let r = matrix.get(i, j);
                        (color::coolwarm(r), format!("{r:.2}"))
                    } else {
                        (Color32::DARK_GRAY, "n/a".to_string())
                    };

                    let painter = ui.painter();
                    painter.rect_filled(rect, 2.0, fill);
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        text,
                        FontId::proportional(12.0),
                        color::contrast_text(fill),
                    );
                    response.on_hover_text(format!("{row_field} vs {col_field}"));
                }
                ui.end_row();
            }
        });

    if matrix.sample_size < 2 {
        ui.label(
            RichText::new(format!(
                "Only {} reading(s): coefficients are undefined.",
                matrix.sample_size
            ))
            .weak(),
        );
    }
}
