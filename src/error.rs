use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Load errors – fatal to the session start
// ---------------------------------------------------------------------------

/// Failure to turn a source file into a [`WeatherTable`](crate::data::model::WeatherTable).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow/Parquet failures carry the full `anyhow` context chain.
    #[error("malformed parquet: {0:#}")]
    Parquet(anyhow::Error),

    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("row {row}: cannot parse timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

// ---------------------------------------------------------------------------
// Per-city analysis errors – recoverable at the UI boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("no readings for '{city}'")]
    EmptySubset { city: String },

    #[error("not enough readings: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },
}
