//! Error handling for CLIDATA import operations.
//!
//! Only conditions that stop a run live here. Per-cell and per-row problems
//! (unmapped elements, unmapped stations, bad values) are counted in the
//! import statistics instead of being raised.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid mapping file: {0}")]
    MappingFile(#[from] toml::de::Error),

    #[error("Input file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid CLIDATA header in {path}: missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage failure while committing batch {batch}: {source}")]
    StorageFailure {
        batch: usize,
        #[source]
        source: Box<ImportError>,
    },
}

impl ImportError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wrap a store error raised while committing a batch
    pub fn storage_failure(batch: usize, source: ImportError) -> Self {
        Self::StorageFailure {
            batch,
            source: Box::new(source),
        }
    }

    /// Whether the error happened while writing to the store
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Self::StorageFailure { .. } | Self::Database(_))
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
