//! Streaming reader for CLIDATA files

use super::column_mapping::ColumnMapping;
use crate::error::{ImportError, Result};
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Streams CLIDATA records with the header already analyzed
#[derive(Debug)]
pub struct ClidataReader<R = File> {
    source: PathBuf,
    reader: csv::Reader<R>,
    mapping: ColumnMapping,
    total_bytes: u64,
}

impl ClidataReader<File> {
    /// Open a CLIDATA file and analyze its header
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ImportError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let total_bytes = std::fs::metadata(path)?.len();
        let file = File::open(path)?;

        info!("Reading CLIDATA file: {}", path.display());
        Self::with_source(file, path, total_bytes)
    }
}

impl<R: Read> ClidataReader<R> {
    /// Read CLIDATA text from any reader; `source` labels it in errors
    pub fn from_reader(reader: R, source: impl AsRef<Path>) -> Result<Self> {
        Self::with_source(reader, source.as_ref(), 0)
    }

    fn with_source(reader: R, source: &Path, total_bytes: u64) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let mapping = ColumnMapping::analyze(&headers, source)?;

        debug!(
            "Column mapping: {} columns, {} day columns, coordinates: {}",
            headers.len(),
            mapping.day_column_count(),
            mapping.has_coordinates()
        );
        if mapping.day_column_count() == 0 {
            warn!(
                "No day columns found in {}; every row will expand to nothing",
                source.display()
            );
        }
        if !mapping.unrecognized.is_empty() {
            debug!("Ignoring columns: {}", mapping.unrecognized.join(", "));
        }

        Ok(Self {
            source: source.to_path_buf(),
            reader,
            mapping,
            total_bytes,
        })
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// File size in bytes, zero when reading from a stream
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Bytes consumed so far
    pub fn bytes_read(&self) -> u64 {
        self.reader.position().byte()
    }

    /// Read the next record into `record`.
    ///
    /// Returns `Ok(false)` at end of input. A malformed record surfaces as a
    /// `csv::Error` that is not an IO error; reading can continue after it.
    pub fn read_record(&mut self, record: &mut StringRecord) -> csv::Result<bool> {
        self.reader.read_record(record)
    }
}
