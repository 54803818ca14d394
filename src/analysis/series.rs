use chrono::NaiveDateTime;

use crate::data::model::{CitySubset, WeatherRecord};

/// Default number of rows in the preview table.
pub const PREVIEW_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Display series handed to the presentation layer
// ---------------------------------------------------------------------------

/// The first `limit` records of the subset.
pub fn preview(subset: &CitySubset<'_>, limit: usize) -> Vec<WeatherRecord> {
    subset
        .records
        .iter()
        .take(limit)
        .map(|&r| r.clone())
        .collect()
}

/// `(timestamp, temperature)` in chronological order.
pub fn temperature_series(subset: &CitySubset<'_>) -> Vec<(NaiveDateTime, f64)> {
    let mut series: Vec<(NaiveDateTime, f64)> = subset
        .records
        .iter()
        .map(|r| (r.last_updated, r.temperature_celsius))
        .collect();
    series.sort_by_key(|(ts, _)| *ts);
    series
}

/// One point of the PM2.5 / PM10 scatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirQualityPoint {
    pub pm2_5: f64,
    pub pm10: f64,
    /// Drives the colour scale.
    pub humidity: f64,
    /// Drives the marker size.
    pub temperature: f64,
}

pub fn air_quality_points(subset: &CitySubset<'_>) -> Vec<AirQualityPoint> {
    subset
        .records
        .iter()
        .map(|r| AirQualityPoint {
            pm2_5: r.air_quality_pm2_5,
            pm10: r.air_quality_pm10,
            humidity: r.humidity,
            temperature: r.temperature_celsius,
        })
        .collect()
}

/// Smallest and largest temperature of the subset, for the reference line.
pub fn temperature_range(subset: &CitySubset<'_>) -> Option<(f64, f64)> {
    subset.records.iter().map(|r| r.temperature_celsius).fold(None, |acc, t| {
        Some(match acc {
            None => (t, t),
            Some((lo, hi)) => (lo.min(t), hi.max(t)),
        })
    })
}

// ---------------------------------------------------------------------------
// Summary metrics of the latest reading
// ---------------------------------------------------------------------------

/// The four headline values, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryMetrics {
    pub temperature: String,
    pub humidity: String,
    pub wind: String,
    pub pressure: String,
}

impl SummaryMetrics {
    pub fn from_record(record: &WeatherRecord) -> Self {
        SummaryMetrics {
            temperature: format!("{}°C", record.temperature_celsius),
            humidity: format!("{}%", record.humidity),
            wind: format!("{} kph", record.wind_kph),
            pressure: format!("{} mb", record.pressure_mb),
        }
    }

    /// `(label, value)` rows in display order.
    pub fn rows(&self) -> [(&'static str, &str); 4] {
        [
            ("Temperature (°C)", self.temperature.as_str()),
            ("Humidity", self.humidity.as_str()),
            ("Wind Speed", self.wind.as_str()),
            ("Pressure", self.pressure.as_str()),
        ]
    }
}
