use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// `(name, base temperature °C, base humidity %, base PM2.5)`
const CITIES: [(&str, f64, f64, f64); 8] = [
    ("Delhi", 36.0, 30.0, 95.0),
    ("Mumbai", 31.0, 72.0, 45.0),
    ("Kolkata", 33.0, 68.0, 70.0),
    ("Chennai", 34.0, 65.0, 38.0),
    ("Bengaluru", 27.0, 55.0, 30.0),
    ("Hyderabad", 32.0, 45.0, 42.0),
    ("Jaipur", 37.0, 22.0, 80.0),
    ("Lucknow", 35.0, 40.0, 88.0),
];

const READINGS_PER_CITY: i64 = 72;

/// One output row, in the column layout of the public weather repository export.
#[derive(Debug, Serialize)]
struct SampleRow {
    country: &'static str,
    location_name: String,
    last_updated: String,
    temperature_celsius: Option<f64>,
    humidity: Option<f64>,
    wind_kph: Option<f64>,
    pressure_mb: Option<f64>,
    #[serde(rename = "air_quality_PM2.5")]
    air_quality_pm2_5: Option<f64>,
    #[serde(rename = "air_quality_PM10")]
    air_quality_pm10: Option<f64>,
    condition_text: &'static str,
}

/// Box-Muller transform for normal noise.
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1 = rng.random::<f64>().max(1e-15);
    let u2 = rng.random::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn generate_rows(rng: &mut StdRng) -> Result<Vec<SampleRow>> {
    let start: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 5, 16)
        .and_then(|d| d.and_hms_opt(0, 15, 0))
        .context("invalid start timestamp")?;

    let mut rows = Vec::new();
    for &(city, base_temp, base_humidity, base_pm) in &CITIES {
        for hour in 0..READINGS_PER_CITY {
            let ts = start + Duration::hours(hour);
            // Diurnal cycle peaking mid-afternoon.
            let phase = ((hour % 24) as f64 - 15.0) / 24.0 * 2.0 * std::f64::consts::PI;
            let daily = phase.cos();

            let humidity = (base_humidity - 12.0 * daily + gauss(rng, 0.0, 4.0)).clamp(5.0, 100.0);
            let wind = (8.0 + 4.0 * daily + gauss(rng, 0.0, 2.0)).max(0.0);
            let pressure = 1006.0 - 3.0 * daily + gauss(rng, 0.0, 1.2);
            let temperature = base_temp + 5.0 * daily - 0.08 * (humidity - base_humidity)
                + 0.1 * wind
                + gauss(rng, 0.0, 0.8);
            let pm2_5 = (base_pm * (1.0 - 0.2 * daily) + gauss(rng, 0.0, 8.0)).max(1.0);
            let pm10 = pm2_5 * 1.6 + gauss(rng, 0.0, 10.0).abs();

            // Roughly 3% of rows lose one reading, like a real export.
            let gap = rng.random_range(0..100) < 3;
            let missing = if gap { rng.random_range(0..6) } else { usize::MAX };
            let cell = |idx: usize, v: f64| (idx != missing).then_some(round1(v));

            rows.push(SampleRow {
                country: "India",
                location_name: city.to_string(),
                last_updated: ts.format("%Y-%m-%d %H:%M").to_string(),
                temperature_celsius: cell(0, temperature),
                humidity: cell(1, humidity),
                wind_kph: cell(2, wind),
                pressure_mb: cell(3, pressure),
                air_quality_pm2_5: cell(4, pm2_5),
                air_quality_pm10: cell(5, pm10),
                condition_text: if humidity > 70.0 { "Mist" } else { "Sunny" },
            });
        }
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn write_csv(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_json(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let file = File::create(path).context("creating JSON file")?;
    serde_json::to_writer_pretty(file, rows).context("writing JSON")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let text = |name: &str| Field::new(name, DataType::Utf8, false);
    let number = |name: &str| Field::new(name, DataType::Float64, true);
    let schema = Arc::new(Schema::new(vec![
        text("country"),
        text("location_name"),
        text("last_updated"),
        number("temperature_celsius"),
        number("humidity"),
        number("wind_kph"),
        number("pressure_mb"),
        number("air_quality_PM2.5"),
        number("air_quality_PM10"),
        text("condition_text"),
    ]));

    let strings = |f: fn(&SampleRow) -> String| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let numbers = |f: fn(&SampleRow) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            strings(|r| r.country.to_string()),
            strings(|r| r.location_name.clone()),
            strings(|r| r.last_updated.clone()),
            numbers(|r| r.temperature_celsius),
            numbers(|r| r.humidity),
            numbers(|r| r.wind_kph),
            numbers(|r| r.pressure_mb),
            numbers(|r| r.air_quality_pm2_5),
            numbers(|r| r.air_quality_pm10),
            strings(|r| r.condition_text.to_string()),
        ],
    )
    .context("building record batch")?;

    let file = File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("IndianWeatherRepository.csv"));

    let mut rng = StdRng::seed_from_u64(42);
    let rows = generate_rows(&mut rng)?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&path, &rows)?,
        "json" => write_json(&path, &rows)?,
        "parquet" | "pq" => write_parquet(&path, &rows)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    println!(
        "Wrote {} readings for {} cities to {}",
        rows.len(),
        CITIES.len(),
        path.display()
    );
    Ok(())
}
