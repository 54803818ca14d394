use chrono::NaiveDateTime;

use super::correlation::{CorrelationMatrix, correlate};
use super::latest::latest;
use super::regression::{RegressionResult, SplitConfig, analyze};
use super::series::{
    AirQualityPoint, SummaryMetrics, air_quality_points, preview, temperature_range,
    temperature_series,
};
use crate::data::filter::filter_by_city;
use crate::data::model::{WeatherRecord, WeatherTable};
use crate::error::AnalysisError;

/// Everything the dashboard shows for one selected city.
///
/// Owns its data so it can outlive the borrow of the table that produced it.
/// Per-city failures are kept as values; building a report never fails.
#[derive(Debug, Clone)]
pub struct CityReport {
    pub city: String,
    pub row_count: usize,
    pub preview: Vec<WeatherRecord>,
    pub regression: RegressionResult,
    pub correlation: CorrelationMatrix,
    pub temperature_series: Vec<(NaiveDateTime, f64)>,
    pub air_quality: Vec<AirQualityPoint>,
    pub temperature_range: Option<(f64, f64)>,
    pub latest: Result<WeatherRecord, AnalysisError>,
}

impl CityReport {
    pub fn build(
        table: &WeatherTable,
        city: &str,
        split: &SplitConfig,
        preview_rows: usize,
    ) -> Self {
        let subset = filter_by_city(table, city);
        log::debug!("Building report for {city}: {} rows", subset.len());

        CityReport {
            city: city.to_string(),
            row_count: subset.len(),
            preview: preview(&subset, preview_rows),
            regression: analyze(&subset, split),
            correlation: correlate(&subset),
            temperature_series: temperature_series(&subset),
            air_quality: air_quality_points(&subset),
            temperature_range: temperature_range(&subset),
            latest: latest(&subset).cloned(),
        }
    }

    /// Headline metrics, if the city has any reading at all.
    pub fn summary(&self) -> Option<SummaryMetrics> {
        self.latest.as_ref().ok().map(SummaryMetrics::from_record)
    }
}
