/// Per-city analytics: every function here is a pure function of a
/// [`CitySubset`](crate::data::model::CitySubset).
///
/// ```text
///   CitySubset ──┬── regression   seeded split, OLS fit, predictions
///                ├── correlation  6×6 Pearson matrix
///                ├── latest       most recent reading
///                └── series       preview rows, chart series, summary
///                        │
///                        ▼
///                   CityReport    owned bundle for the UI
/// ```

pub mod correlation;
pub mod latest;
pub mod regression;
pub mod report;
pub mod series;
