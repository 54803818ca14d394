use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, anyhow};
use arrow::array::{Array, ArrayRef, AsArray, TimestampMillisecondArray};
use arrow::compute::{CastOptions, cast_with_options};
use arrow::datatypes::{DataType, Float64Type, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{COL_CITY, COL_TIMESTAMP, REQUIRED_COLUMNS, WeatherRecord, WeatherTable};
use crate::error::LoadError;

/// Cell contents treated as missing: the default NA tokens of dataframe CSV readers.
const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Accepted `last_updated` layouts besides RFC 3339.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a weather table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one observation per line (the native export)
/// * `.json`    – `[{ "location_name": "...", "last_updated": "...", ... }, ...]`
/// * `.parquet` – flat columns with the same names
///
/// Rows with any missing cell are dropped, in every column of the source,
/// not just the ones the dashboard reads.
pub fn load_file(path: &Path) -> Result<WeatherTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(open(path)?),
        "json" => read_json(open(path)?),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }?;

    log::info!(
        "Loaded {} records from {} ({} incomplete rows dropped)",
        table.len(),
        path.display(),
        table.rows_dropped
    );
    Ok(table)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Whether a textual cell counts as missing.
pub fn is_missing(cell: &str) -> bool {
    NA_TOKENS.contains(&cell.trim())
}

/// Parse a `last_updated` cell into a naive (UTC for offset inputs) timestamp.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Some(ts) = TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn require_columns(mut has: impl FnMut(&str) -> bool) -> Result<(), LoadError> {
    match REQUIRED_COLUMNS.iter().find(|col| !has(col)) {
        Some(col) => Err(LoadError::MissingColumn(col.to_string())),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Row decoding shared by the CSV and JSON loaders
// ---------------------------------------------------------------------------

/// One source row as decoded by serde, before the timestamp is parsed.
#[derive(Debug, Deserialize)]
struct RawRow {
    location_name: String,
    last_updated: String,
    temperature_celsius: f64,
    humidity: f64,
    wind_kph: f64,
    pressure_mb: f64,
    #[serde(rename = "air_quality_PM2.5")]
    air_quality_pm2_5: f64,
    #[serde(rename = "air_quality_PM10")]
    air_quality_pm10: f64,
}

impl RawRow {
    fn into_record(self, row: usize) -> Result<WeatherRecord, LoadError> {
        let last_updated =
            parse_timestamp(&self.last_updated).ok_or_else(|| LoadError::InvalidTimestamp {
                row,
                value: self.last_updated.clone(),
            })?;
        Ok(WeatherRecord {
            location_name: self.location_name,
            last_updated,
            temperature_celsius: self.temperature_celsius,
            humidity: self.humidity,
            wind_kph: self.wind_kph,
            pressure_mb: self.pressure_mb,
            air_quality_pm2_5: self.air_quality_pm2_5,
            air_quality_pm10: self.air_quality_pm10,
        })
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Keep complete records only; non-finite readings are missing values too.
fn push_complete(
    records: &mut Vec<WeatherRecord>,
    record: WeatherRecord,
    origin: &str,
    row: usize,
) {
    if record.has_finite_readings() {
        records.push(record);
    } else {
        log::trace!("{origin} row {row}: dropped, non-finite reading");
    }
}

/// CSV layout: header row with column names, extra columns allowed.
///
/// Text cells are kept verbatim, so `" Delhi"` and `"Delhi"` are different
/// cities. Surrounding whitespace is ignored only for the NA check and for
/// the numeric columns.
pub fn read_csv<R: Read>(source: R) -> Result<WeatherTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new().from_reader(source);
    let headers = reader.headers()?.clone();
    require_columns(|col| headers.iter().any(|h| h == col))?;
    let numeric: Vec<bool> = headers
        .iter()
        .map(|h| REQUIRED_COLUMNS[2..].contains(&h))
        .collect();

    let mut records = Vec::new();
    let mut rows_read = 0;

    for (row_no, result) in reader.records().enumerate() {
        let row = result?;
        rows_read += 1;

        if row.iter().any(is_missing) {
            log::trace!("CSV row {row_no}: dropped, missing cell");
            continue;
        }

        let row: csv::StringRecord = row
            .iter()
            .zip(&numeric)
            .map(|(cell, &is_number)| if is_number { cell.trim() } else { cell })
            .collect();
        let raw: RawRow = row.deserialize(Some(&headers))?;
        push_complete(&mut records, raw.into_record(row_no)?, "CSV", row_no);
    }

    Ok(WeatherTable::new(records, rows_read))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "location_name": "Delhi",
///     "last_updated": "2024-05-16 13:15",
///     "temperature_celsius": 38.1,
///     ...
///   }
/// ]
/// ```
///
/// A required key must appear in at least one record; a record without it
/// is incomplete and dropped.
pub fn read_json<R: Read>(source: R) -> Result<WeatherTable, LoadError> {
    let root: JsonValue = serde_json::from_reader(source)?;
    let rows = match root {
        JsonValue::Array(rows) => rows,
        _ => {
            return Err(LoadError::Json(serde::de::Error::custom(
                "expected top-level JSON array",
            )));
        }
    };

    let objects = rows
        .into_iter()
        .enumerate()
        .map(|(row_no, row)| match row {
            JsonValue::Object(obj) => Ok(obj),
            _ => Err(LoadError::Json(serde::de::Error::custom(format!(
                "row {row_no} is not a JSON object"
            )))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    require_columns(|col| objects.iter().any(|obj| obj.contains_key(col)))?;

    let mut records = Vec::with_capacity(objects.len());
    let rows_read = objects.len();

    for (row_no, obj) in objects.into_iter().enumerate() {
        let incomplete = REQUIRED_COLUMNS.iter().any(|col| !obj.contains_key(*col))
            || obj.values().any(|v| match v {
                JsonValue::Null => true,
                JsonValue::String(s) => is_missing(s),
                _ => false,
            });
        if incomplete {
            log::trace!("JSON row {row_no}: dropped, missing value");
            continue;
        }

        let raw: RawRow = serde_json::from_value(JsonValue::Object(obj))?;
        push_complete(&mut records, raw.into_record(row_no)?, "JSON", row_no);
    }

    Ok(WeatherTable::new(records, rows_read))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of observations.
///
/// Expected schema: the same flat columns as the CSV export. `last_updated`
/// may be text, a date or an Arrow timestamp; numeric columns may be any
/// type Arrow can cast to `Float64`.
fn load_parquet(path: &Path) -> Result<WeatherTable, LoadError> {
    let file = open(path)?;
    read_parquet(file).map_err(|err| match err.downcast::<LoadError>() {
        Ok(typed) => typed,
        Err(other) => LoadError::Parquet(other),
    })
}

/// The timestamp column of one record batch, normalised to one of two shapes.
enum TimestampColumn {
    Text(ArrayRef),
    Millis(TimestampMillisecondArray),
}

fn read_parquet(file: File) -> anyhow::Result<WeatherTable> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let strict = CastOptions {
        safe: false,
        ..Default::default()
    };

    let mut records = Vec::new();
    let mut rows_read = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        require_columns(|col| schema.index_of(col).is_ok())?;

        let city = cast_with_options(column(&batch, COL_CITY)?, &DataType::Utf8, &strict)
            .context("casting location_name to text")?;
        let city = city.as_string::<i32>();

        let stamp_col = column(&batch, COL_TIMESTAMP)?;
        let stamps = match stamp_col.data_type() {
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => TimestampColumn::Text(
                cast_with_options(stamp_col, &DataType::Utf8, &strict)
                    .context("casting last_updated to text")?,
            ),
            _ => {
                let target = DataType::Timestamp(TimeUnit::Millisecond, None);
                let millis = cast_with_options(stamp_col, &target, &strict)
                    .context("casting last_updated to a timestamp")?;
                TimestampColumn::Millis(
                    millis
                        .as_any()
                        .downcast_ref::<TimestampMillisecondArray>()
                        .context("expected TimestampMillisecondArray")?
                        .clone(),
                )
            }
        };

        // Numeric columns in `WeatherRecord` field order after the two text ones.
        let mut numeric = Vec::with_capacity(6);
        for name in &REQUIRED_COLUMNS[2..] {
            let cast = cast_with_options(column(&batch, name)?, &DataType::Float64, &strict)
                .with_context(|| format!("column '{name}' is not numeric"))?;
            numeric.push(cast);
        }
        let numeric: Vec<_> = numeric
            .iter()
            .map(|a| a.as_primitive::<Float64Type>())
            .collect();

        for row in 0..batch.num_rows() {
            let row_no = rows_read;
            rows_read += 1;

            let incomplete = batch.columns().iter().any(|c| c.is_null(row))
                || is_missing(city.value(row));
            if incomplete {
                log::trace!("Parquet row {row_no}: dropped, null cell");
                continue;
            }

            let last_updated = match &stamps {
                TimestampColumn::Text(text) => {
                    let raw = text.as_string::<i32>().value(row);
                    if is_missing(raw) {
                        continue;
                    }
                    parse_timestamp(raw).ok_or_else(|| LoadError::InvalidTimestamp {
                        row: row_no,
                        value: raw.to_string(),
                    })?
                }
                TimestampColumn::Millis(millis) => millis
                    .value_as_datetime(row)
                    .with_context(|| format!("Row {row_no}: timestamp out of range"))?,
            };

            let value = |i: usize| numeric[i].value(row);
            let values = [value(0), value(1), value(2), value(3), value(4), value(5)];

            let record = WeatherRecord {
                location_name: city.value(row).to_string(),
                last_updated,
                temperature_celsius: values[0],
                humidity: values[1],
                wind_kph: values[2],
                pressure_mb: values[3],
                air_quality_pm2_5: values[4],
                air_quality_pm10: values[5],
            };
            push_complete(&mut records, record, "Parquet", row_no);
        }
    }

    log::debug!("Parquet: {rows_read} rows read, {} complete", records.len());
    Ok(WeatherTable::new(records, rows_read))
}

fn column<'b>(batch: &'b RecordBatch, name: &str) -> anyhow::Result<&'b ArrayRef> {
    let idx = batch
        .schema_ref()
        .index_of(name)
        .map_err(|_| anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{Field as ArrowField, Schema};
    use chrono::Timelike;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str = "country,location_name,last_updated,temperature_celsius,humidity,wind_kph,pressure_mb,air_quality_PM2.5,air_quality_PM10";

    fn csv_text(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn csv_rows_with_missing_cells_are_dropped() {
        let text = csv_text(&[
            "India,Delhi,2024-05-16 13:15,38.1,20,14.4,1004,80.5,120.2",
            "India,Delhi,2024-05-16 14:15,,22,10.1,1003,70.0,110.0",
            ",Mumbai,2024-05-16 13:15,31.0,70,18.0,1008,40.0,60.0",
            "India,Mumbai,2024-05-16 14:15,NaN,71,17.0,1008,41.0,61.0",
            "India,Mumbai,2024-05-16 15:15,30.5,72,16.0,1007,42.0,62.0",
        ]);
        let table = read_csv(text.as_bytes()).unwrap();

        assert_eq!(table.rows_read, 5);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows_dropped, 3);
        assert_eq!(table.records[0].location_name, "Delhi");
        assert_eq!(table.records[0].air_quality_pm2_5, 80.5);
        assert_eq!(table.records[1].location_name, "Mumbai");
        assert_eq!(table.records[1].last_updated.hour(), 15);
    }

    #[test]
    fn csv_non_finite_readings_are_dropped() {
        let text = csv_text(&[
            "India,Delhi,2024-05-16 13:15,NAN,20,14.4,1004,80.5,120.2",
            "India,Delhi,2024-05-16 14:15,38.0,inf,14.4,1004,80.5,120.2",
            "India,Delhi,2024-05-16 15:15,38.0,20,-Infinity,1004,80.5,120.2",
            "India,Delhi,2024-05-16 16:15,37.5,21,12.0,1005,79.0,118.0",
        ]);
        let table = read_csv(text.as_bytes()).unwrap();

        assert_eq!(table.rows_read, 4);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows_dropped, 3);
        assert!(table.records.iter().all(WeatherRecord::has_finite_readings));
        assert_eq!(table.records[0].last_updated.hour(), 16);
    }

    #[test]
    fn csv_default_na_tokens_drop_rows() {
        for token in ["n/a", "<NA>", "-nan", "#NA", "#N/A N/A", "1.#IND", "-1.#QNAN"] {
            let row = format!("India,Delhi,2024-05-16 13:15,38.1,{token},14.4,1004,80.5,120.2");
            let text = csv_text(&[
                row.as_str(),
                "India,Delhi,2024-05-16 14:15,37.0,22,10.1,1003,70.0,110.0",
            ]);
            let table = read_csv(text.as_bytes()).unwrap();
            assert_eq!(table.len(), 1, "token {token:?}");
            assert_eq!(table.rows_dropped, 1, "token {token:?}");
        }
    }

    #[test]
    fn csv_text_cells_keep_their_whitespace() {
        let text = csv_text(&[
            "India, Delhi,2024-05-16 13:15, 38.1 ,20,14.4,1004,80.5,120.2",
            "India,Delhi, 2024-05-16 14:15,37.0,22 ,10.1,1003,70.0,110.0",
        ]);
        let table = read_csv(text.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].location_name, " Delhi");
        assert_eq!(table.records[0].temperature_celsius, 38.1);
        assert_eq!(table.records[1].location_name, "Delhi");
        assert_eq!(table.records[1].humidity, 22.0);
    }

    #[test]
    fn csv_missing_required_column_fails() {
        let text = "location_name,last_updated,temperature_celsius\nDelhi,2024-05-16 13:15,38.1";
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(col) if col == "humidity"));
    }

    #[test]
    fn csv_non_numeric_value_fails() {
        let text = csv_text(&["India,Delhi,2024-05-16 13:15,hot,20,14.4,1004,80.5,120.2"]);
        assert!(matches!(
            read_csv(text.as_bytes()),
            Err(LoadError::Csv(_))
        ));
    }

    #[test]
    fn csv_bad_timestamp_fails() {
        let text = csv_text(&["India,Delhi,yesterday,38.1,20,14.4,1004,80.5,120.2"]);
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidTimestamp { row: 0, .. }));
    }

    #[test]
    fn timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 16)
            .unwrap()
            .and_hms_opt(13, 15, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-05-16 13:15"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-16 13:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-16T13:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-16T18:45:00+05:30"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-05-16"),
            NaiveDate::from_ymd_opt(2024, 5, 16).map(|d| d.and_time(NaiveTime::MIN))
        );
        assert_eq!(parse_timestamp("16/05/2024"), None);
    }

    #[test]
    fn json_records_drop_nulls() {
        let text = r#"[
            {"location_name": "Delhi", "last_updated": "2024-05-16 13:15",
             "temperature_celsius": 38.1, "humidity": 20, "wind_kph": 14.4,
             "pressure_mb": 1004, "air_quality_PM2.5": 80.5, "air_quality_PM10": 120.2},
            {"location_name": "Delhi", "last_updated": "2024-05-16 14:15",
             "temperature_celsius": null, "humidity": 20, "wind_kph": 14.4,
             "pressure_mb": 1004, "air_quality_PM2.5": 80.5, "air_quality_PM10": 120.2}
        ]"#;
        let table = read_json(text.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows_dropped, 1);
        assert_eq!(table.records[0].humidity, 20.0);
    }

    #[test]
    fn json_record_without_a_key_is_dropped() {
        let text = r#"[
            {"location_name": "Delhi", "last_updated": "2024-05-16 13:15",
             "temperature_celsius": 38.1, "humidity": 20, "wind_kph": 14.4,
             "pressure_mb": 1004, "air_quality_PM2.5": 80.5, "air_quality_PM10": 120.2},
            {"location_name": "Delhi", "last_updated": "2024-05-16 14:15",
             "humidity": 21, "wind_kph": 12.0,
             "pressure_mb": 1005, "air_quality_PM2.5": 79.0, "air_quality_PM10": 118.0}
        ]"#;
        let table = read_json(text.as_bytes()).unwrap();
        assert_eq!(table.rows_read, 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].temperature_celsius, 38.1);
    }

    #[test]
    fn json_key_absent_from_every_record_fails() {
        let text = r#"[
            {"location_name": "Delhi", "last_updated": "2024-05-16 13:15",
             "temperature_celsius": 38.1, "wind_kph": 14.4,
             "pressure_mb": 1004, "air_quality_PM2.5": 80.5, "air_quality_PM10": 120.2}
        ]"#;
        let err = read_json(text.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(col) if col == "humidity"));
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(matches!(
            read_json(r#"{"location_name": "Delhi"}"#.as_bytes()),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn load_file_dispatches_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("weather.csv");
        let mut f = File::create(&csv_path).unwrap();
        writeln!(
            f,
            "{}",
            csv_text(&["India,Pune,2024-05-16 13:15,33.0,40,9.0,1006,35.0,55.0"])
        )
        .unwrap();
        assert_eq!(load_file(&csv_path).unwrap().len(), 1);

        let txt_path = dir.path().join("weather.txt");
        File::create(&txt_path).unwrap();
        assert!(matches!(
            load_file(&txt_path),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "txt"
        ));

        assert!(matches!(
            load_file(&dir.path().join("absent.csv")),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn parquet_round_trip_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather.parquet");

        let mut fields = vec![
            ArrowField::new(COL_CITY, DataType::Utf8, true),
            ArrowField::new(COL_TIMESTAMP, DataType::Utf8, true),
        ];
        for name in &REQUIRED_COLUMNS[2..] {
            fields.push(ArrowField::new(*name, DataType::Float64, true));
        }
        let schema = Arc::new(Schema::new(fields));

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec![Some("Chennai"), Some("Chennai")])),
            Arc::new(StringArray::from(vec![
                Some("2024-05-16 10:00"),
                Some("2024-05-16 11:00"),
            ])),
            Arc::new(Float64Array::from(vec![Some(34.0), None])),
        ];
        for _ in 0..5 {
            columns.push(Arc::new(Float64Array::from(vec![Some(1.0), Some(2.0)])));
        }
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.rows_read, 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].location_name, "Chennai");
        assert_eq!(table.records[0].temperature_celsius, 34.0);
        assert_eq!(table.records[0].air_quality_pm10, 1.0);
    }
}
