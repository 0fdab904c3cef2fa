use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Main application error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Unsupported report format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No XML report found in archive: {path}")]
    NoXmlMember { path: PathBuf },

    #[error("XML parse error: {details}")]
    Parse { details: String },

    #[error("Invalid report structure: {reason}")]
    Validation { reason: String },

    #[error("Report directory error: {path} - {reason}")]
    Directory { path: PathBuf, reason: String },

    #[error("Failed to write report: {path} - {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Concurrent operation error: {details}")]
    Concurrency { details: String },
}

impl ReportError {
    /// Wrap any I/O-like failure while reading a report container
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::FileRead {
            path: path.into(),
            source,
        }
    }
}

impl From<ConfigError> for ReportError {
    fn from(err: ConfigError) -> Self {
        ReportError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ReportError>;
