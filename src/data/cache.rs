use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::load_file;
use super::model::WeatherTable;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Source version: what must stay the same for a cached table to be reused
// ---------------------------------------------------------------------------

/// Identity of a source file's contents as seen by the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceVersion {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceVersion {
    /// Stat the file at `path`.
    pub fn current(path: &Path) -> Result<Self, LoadError> {
        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let canonical = path.canonicalize().map_err(io_err)?;
        let meta = std::fs::metadata(&canonical).map_err(io_err)?;
        Ok(SourceVersion {
            path: canonical,
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// DatasetCache – a single memoized load
// ---------------------------------------------------------------------------

/// Holds at most one loaded table together with the version it was read from.
///
/// The table is shared read-only through `Arc`; callers clone the handle, never
/// the records.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(SourceVersion, Arc<WeatherTable>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table when `path` is unchanged, else load and replace.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<WeatherTable>, LoadError> {
        let version = SourceVersion::current(path)?;

        if let Some((cached, table)) = &self.entry {
            if *cached == version {
                log::debug!("Cache hit for {}", version.path.display());
                return Ok(Arc::clone(table));
            }
        }

        let table = Arc::new(load_file(&version.path)?);
        self.entry = Some((version, Arc::clone(&table)));
        Ok(table)
    }

    /// Force the next [`get_or_load`](Self::get_or_load) to re-read the source.
    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            log::debug!("Dataset cache invalidated");
        }
    }

    /// Version of the currently cached table, if any.
    pub fn version(&self) -> Option<&SourceVersion> {
        self.entry.as_ref().map(|(v, _)| v)
    }
}
