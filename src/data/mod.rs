/// Data layer: core types, loading, caching and city selection.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, drop incomplete rows → WeatherTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  (SourceVersion, Arc<WeatherTable>)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  distinct cities, city name → CitySubset
///   └──────────┘
/// ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
