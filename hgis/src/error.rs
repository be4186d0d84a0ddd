//! Error types used by the crate.

use hgis_types::error::{CrsError, TransformError};
use std::path::PathBuf;
use thiserror::Error;

/// Error opening or reading a feature data source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// The file does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    /// The file extension is not one of the supported vector formats.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    /// The format is supported but no driver for it is registered.
    #[error("no driver registered for format `{0}`")]
    DriverUnavailable(String),
    /// The data source could not be read.
    #[error("failed to read data source: {0}")]
    Io(String),
    /// The content of the data source is malformed.
    #[error("failed to parse data source: {0}")]
    Parse(String),
    /// The provider was used before a successful `open`.
    #[error("data source is not open")]
    NotOpen,
}

/// HGIS error type.
#[derive(Debug, Error)]
pub enum HgisError {
    /// Data source error.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Coordinate reference system error.
    #[error(transparent)]
    Crs(#[from] CrsError),
    /// Coordinate transformation error.
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// Error reading/writing data to the FS.
    #[error("failed to access file: {0}")]
    FsIo(#[from] std::io::Error),
    /// Settings could not be serialized or deserialized.
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}
