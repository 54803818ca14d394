use std::fmt;

use chrono::NaiveDateTime;

// ---------------------------------------------------------------------------
// Column names of the source table
// ---------------------------------------------------------------------------

pub const COL_CITY: &str = "location_name";
pub const COL_TIMESTAMP: &str = "last_updated";
pub const COL_TEMPERATURE: &str = "temperature_celsius";
pub const COL_HUMIDITY: &str = "humidity";
pub const COL_WIND: &str = "wind_kph";
pub const COL_PRESSURE: &str = "pressure_mb";
pub const COL_PM2_5: &str = "air_quality_PM2.5";
pub const COL_PM10: &str = "air_quality_PM10";

/// Every column a row must carry to become a [`WeatherRecord`].
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_CITY,
    COL_TIMESTAMP,
    COL_TEMPERATURE,
    COL_HUMIDITY,
    COL_WIND,
    COL_PRESSURE,
    COL_PM2_5,
    COL_PM10,
];

// ---------------------------------------------------------------------------
// WeatherRecord – one row of the observation table
// ---------------------------------------------------------------------------

/// A single complete observation. Rows with any missing cell never make it
/// this far.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub location_name: String,
    pub last_updated: NaiveDateTime,
    pub temperature_celsius: f64,
    pub humidity: f64,
    pub wind_kph: f64,
    pub pressure_mb: f64,
    pub air_quality_pm2_5: f64,
    pub air_quality_pm10: f64,
}

impl WeatherRecord {
    /// Whether every numeric reading is a finite number. `NaN` and the
    /// infinities count as missing.
    pub fn has_finite_readings(&self) -> bool {
        Field::ALL.iter().all(|f| f.value_of(self).is_finite())
    }
}

// ---------------------------------------------------------------------------
// Field – statically typed accessor for the numeric columns
// ---------------------------------------------------------------------------

/// The numeric columns the analytics operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Temperature,
    Humidity,
    WindKph,
    PressureMb,
    Pm25,
    Pm10,
}

impl Field {
    /// Order used by the correlation matrix: target, predictors, air quality.
    pub const ALL: [Field; 6] = [
        Field::Temperature,
        Field::Humidity,
        Field::WindKph,
        Field::PressureMb,
        Field::Pm25,
        Field::Pm10,
    ];

    /// Regression predictors of temperature.
    pub const PREDICTORS: [Field; 3] = [Field::Humidity, Field::WindKph, Field::PressureMb];

    pub fn value_of(self, record: &WeatherRecord) -> f64 {
        match self {
            Field::Temperature => record.temperature_celsius,
            Field::Humidity => record.humidity,
            Field::WindKph => record.wind_kph,
            Field::PressureMb => record.pressure_mb,
            Field::Pm25 => record.air_quality_pm2_5,
            Field::Pm10 => record.air_quality_pm10,
        }
    }

    /// Column name in the source file.
    pub fn column(self) -> &'static str {
        match self {
            Field::Temperature => COL_TEMPERATURE,
            Field::Humidity => COL_HUMIDITY,
            Field::WindKph => COL_WIND,
            Field::PressureMb => COL_PRESSURE,
            Field::Pm25 => COL_PM2_5,
            Field::Pm10 => COL_PM10,
        }
    }

    /// Short human label with unit.
    pub fn label(self) -> &'static str {
        match self {
            Field::Temperature => "Temperature (°C)",
            Field::Humidity => "Humidity (%)",
            Field::WindKph => "Wind (kph)",
            Field::PressureMb => "Pressure (mb)",
            Field::Pm25 => "PM2.5 (µg/m³)",
            Field::Pm10 => "PM10 (µg/m³)",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// WeatherTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The immutable in-memory table produced by the loader.
#[derive(Debug, Clone, Default)]
pub struct WeatherTable {
    /// Complete records, in source order.
    pub records: Vec<WeatherRecord>,
    /// Data rows seen in the source (before dropping).
    pub rows_read: usize,
    /// Rows discarded for having a missing cell.
    pub rows_dropped: usize,
}

impl WeatherTable {
    pub fn new(records: Vec<WeatherRecord>, rows_read: usize) -> Self {
        let rows_dropped = rows_read.saturating_sub(records.len());
        WeatherTable {
            records,
            rows_read,
            rows_dropped,
        }
    }

    /// Number of complete records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// CitySubset – read-only view over one city's records
// ---------------------------------------------------------------------------

/// All records of a single city, borrowed from the table in source order.
#[derive(Debug, Clone)]
pub struct CitySubset<'a> {
    pub city: String,
    pub records: Vec<&'a WeatherRecord>,
}

impl<'a> CitySubset<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of one column, aligned with `records`.
    pub fn column(&self, field: Field) -> Vec<f64> {
        self.records.iter().map(|r| field.value_of(r)).collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    use super::WeatherRecord;

    pub fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 16)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    /// A record `hours` after [`base_time`] with loosely linear readings.
    pub fn record(city: &str, hours: i64, temperature: f64) -> WeatherRecord {
        WeatherRecord {
            location_name: city.to_string(),
            last_updated: base_time() + Duration::hours(hours),
            temperature_celsius: temperature,
            humidity: 40.0 + (hours % 7) as f64 * 3.0,
            wind_kph: 5.0 + (hours % 5) as f64 * 1.5,
            pressure_mb: 1000.0 + (hours % 11) as f64,
            air_quality_pm2_5: 30.0 + (hours % 13) as f64 * 2.0,
            air_quality_pm10: 60.0 + (hours % 13) as f64 * 3.5,
        }
    }
}
