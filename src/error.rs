//! Error types for propstore

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for propstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for propstore
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Lock Errors
    // -------------------------------------------------------------------------
    #[error("Could not lock file '{path}' within {waited:?}")]
    LockTimeout { path: PathBuf, waited: Duration },

    #[error("Failed to create lock sentinel '{path}': {source}")]
    LockAcquire {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Property Errors
    // -------------------------------------------------------------------------
    #[error("Failed reading property file '{path}': {reason}")]
    PropertyRead { path: PathBuf, reason: String },

    #[error("Invalid property key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Type mismatch for {key}: expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete file '{path}': {source}")]
    FileDelete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize properties: {0}")]
    Serialize(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this error is a lock acquisition timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::LockTimeout { .. })
    }

    /// Check if this error means a property file could not be parsed
    #[must_use]
    pub fn is_read_error(&self) -> bool {
        matches!(self, Error::PropertyRead { .. })
    }

    /// Check if this error was caused by an invalid key
    #[must_use]
    pub fn is_key_error(&self) -> bool {
        matches!(self, Error::InvalidKey { .. })
    }

    /// Check if this is a write-side I/O failure
    #[must_use]
    pub fn is_write_error(&self) -> bool {
        matches!(
            self,
            Error::FileWrite { .. } | Error::FileDelete { .. } | Error::DirectoryCreate { .. }
        )
    }
}
