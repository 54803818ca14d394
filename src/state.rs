use std::path::PathBuf;
use std::sync::Arc;

use crate::analysis::report::CityReport;
use crate::config::AppConfig;
use crate::data::cache::DatasetCache;
use crate::data::filter::distinct_cities;
use crate::data::model::WeatherTable;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Single memoized load, keyed on the source file's version.
    pub cache: DatasetCache,

    /// Loaded table (None until a load succeeds).
    pub dataset: Option<Arc<WeatherTable>>,

    /// File the current dataset came from.
    pub source: Option<PathBuf>,

    /// Sorted city names offered by the selector.
    pub cities: Vec<String>,

    pub selected_city: Option<String>,

    /// Analytics for `selected_city`, rebuilt only when the selection changes.
    pub report: Option<CityReport>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            cache: DatasetCache::new(),
            dataset: None,
            source: None,
            cities: Vec::new(),
            selected_city: None,
            report: None,
            status_message: None,
        }
    }

    /// Load (or reuse from cache) the table at `path`.
    ///
    /// A failed load leaves the dashboard without data and shows the error.
    pub fn load_path(&mut self, path: PathBuf) {
        match self.cache.get_or_load(&path) {
            Ok(table) => {
                log::info!(
                    "{} records for {} cities from {}",
                    table.len(),
                    distinct_cities(&table).len(),
                    path.display()
                );
                self.source = Some(path);
                self.set_dataset(table);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
                self.dataset = None;
                self.source = Some(path);
                self.cities.clear();
                self.selected_city = None;
                self.report = None;
            }
        }
    }

    /// Drop the cached table and read the current source again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        if let Some(path) = self.source.clone() {
            self.load_path(path);
        }
    }

    /// Ingest a loaded table, keeping the selected city when it still exists.
    pub fn set_dataset(&mut self, table: Arc<WeatherTable>) {
        self.cities = distinct_cities(&table);
        self.dataset = Some(table);
        self.status_message = None;

        let keep = self
            .selected_city
            .take()
            .filter(|city| self.cities.contains(city));
        self.report = None;
        match keep.or_else(|| self.cities.first().cloned()) {
            Some(city) => self.select_city(city),
            None => self.status_message = Some("No complete rows in this file.".to_string()),
        }
    }

    /// Switch the selection and rebuild the report if it changed.
    pub fn select_city(&mut self, city: String) {
        if self.selected_city.as_deref() == Some(city.as_str()) && self.report.is_some() {
            return;
        }
        let Some(table) = &self.dataset else {
            return;
        };
        let report = CityReport::build(
            table,
            &city,
            &self.config.split,
            self.config.preview_rows,
        );
        if let Err(e) = &report.latest {
            log::warn!("{e}");
        }
        self.report = Some(report);
        self.selected_city = Some(city);
    }
}
