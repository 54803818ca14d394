use chrono::{DateTime, NaiveDateTime};
use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoints, Points};

use crate::analysis::regression::RegressionResult;
use crate::analysis::series::AirQualityPoint;
use crate::color;

const PLOT_HEIGHT: f32 = 300.0;
const PREDICTION_COLOR: Color32 = Color32::from_rgb(128, 0, 128);

fn no_data(ui: &mut Ui, what: &str) {
    ui.label(RichText::new(format!("Not enough data for {what}.")).weak());
}

// ---------------------------------------------------------------------------
// Actual vs predicted temperature
// ---------------------------------------------------------------------------

/// Scatter of test-set predictions against the perfect-prediction diagonal.
pub fn actual_vs_predicted(ui: &mut Ui, result: &RegressionResult, range: Option<(f64, f64)>) {
    if result.is_empty() {
        no_data(ui, "a train/test split");
        return;
    }

    Plot::new("actual_vs_predicted")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Actual Temperature (°C)")
        .y_axis_label("Predicted Temperature (°C)")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(result.pairs()))
                    .name("Predictions")
                    .color(PREDICTION_COLOR.gamma_multiply(0.6))
                    .radius(3.5)
                    .filled(true),
            );

            if let Some((lo, hi)) = range {
                plot_ui.line(
                    Line::new(PlotPoints::from(vec![[lo, lo], [hi, hi]]))
                        .name("Perfect Prediction")
                        .color(Color32::RED)
                        .style(LineStyle::dashed_loose()),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Temperature over time
// ---------------------------------------------------------------------------

fn epoch_seconds(ts: NaiveDateTime) -> f64 {
    ts.and_utc().timestamp() as f64
}

fn format_epoch(seconds: f64, fmt: &str) -> String {
    DateTime::from_timestamp(seconds as i64, 0)
        .map(|dt| dt.format(fmt).to_string())
        .unwrap_or_default()
}

/// Line chart of temperature against chronologically sorted timestamps.
pub fn temperature_over_time(ui: &mut Ui, series: &[(NaiveDateTime, f64)]) {
    if series.is_empty() {
        no_data(ui, "a time series");
        return;
    }

    let points: PlotPoints = series
        .iter()
        .map(|&(ts, t)| [epoch_seconds(ts), t])
        .collect();

    Plot::new("temperature_over_time")
        .height(PLOT_HEIGHT)
        .x_axis_label("Date")
        .y_axis_label("Temperature (°C)")
        .x_axis_formatter(|mark, _range| format_epoch(mark.value, "%m-%d %H:%M"))
        .label_formatter(|_name, value| {
            format!(
                "{}\n{:.1} °C",
                format_epoch(value.x, "%Y-%m-%d %H:%M"),
                value.y
            )
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("Temperature")
                    .color(Color32::from_rgb(99, 110, 250))
                    .width(1.5),
            );
        });
}

// ---------------------------------------------------------------------------
// Air quality scatter
// ---------------------------------------------------------------------------

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Position of `v` within `[lo, hi]`, or the middle for a flat range.
fn normalise(v: f64, (lo, hi): (f64, f64)) -> f64 {
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        0.5
    } else {
        (v - lo) / span
    }
}

/// PM2.5 against PM10, coloured by humidity and sized by temperature.
pub fn air_quality_scatter(ui: &mut Ui, points: &[AirQualityPoint]) {
    if points.is_empty() {
        no_data(ui, "an air-quality scatter");
        return;
    }

    let humidity = extent(points.iter().map(|p| p.humidity));
    let temperature = extent(points.iter().map(|p| p.temperature));

    Plot::new("air_quality_scatter")
        .height(PLOT_HEIGHT)
        .x_axis_label("PM2.5 Concentration (µg/m³)")
        .y_axis_label("PM10 Concentration (µg/m³)")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for p in points {
                let radius = 2.0 + 6.0 * normalise(p.temperature, temperature) as f32;
                plot_ui.points(
                    Points::new(PlotPoints::from(vec![[p.pm2_5, p.pm10]]))
                        .color(color::viridis(normalise(p.humidity, humidity)))
                        .radius(radius)
                        .filled(true),
                );
            }
        });

    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new(format!("humidity {:.0}%", humidity.0)).small());
        for step in 0..=8 {
            let swatch = color::viridis(step as f64 / 8.0);
            ui.label(RichText::new("■").color(swatch));
        }
        ui.label(RichText::new(format!("{:.0}%", humidity.1)).small());
        ui.separator();
        ui.label(
            RichText::new(format!(
                "marker size: temperature {:.1}–{:.1} °C",
                temperature.0, temperature.1
            ))
            .small(),
        );
    });
}
