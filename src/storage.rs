//! Storage backend trait and implementations
//!
//! A property file holds exactly one top-level JSON object. File absence is
//! a valid state (no properties), so the raw read reports it as `None`
//! rather than as an error. Content is read as bytes: invalid UTF-8 is a
//! parse failure like any other malformed document.

use crate::error::{Error, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::io::ErrorKind;
use std::path::Path;

/// Trait for storage backend implementations
pub trait StorageBackend: Clone + Send + Sync {
    /// Serialize data to string
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String>;

    /// Deserialize data from raw file bytes
    fn deserialize<T: DeserializeOwned>(&self, content: &[u8]) -> Result<T>;

    /// Read the raw file content, or `None` if the file does not exist
    fn read_raw(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match std::fs::read(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::FileRead {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Serialize and write to file
    ///
    /// Uses atomic write: writes to temp file then renames, so readers see
    /// either the old or the new content in full.
    fn write<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let content = self.serialize(data)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let file_name = path.file_name().ok_or_else(|| {
            Error::Config(format!(
                "Invalid path '{}': must have a filename",
                path.display()
            ))
        })?;
        let mut temp_filename = file_name.to_os_string();
        temp_filename.push(".tmp");
        let temp_path = path.with_file_name(temp_filename);

        std::fs::write(&temp_path, &content).map_err(|e| Error::FileWrite {
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            Error::FileWrite {
                path: path.to_path_buf(),
                source: e,
            }
        })
    }

    /// Delete the file if it exists; a missing file is not an error
    fn delete(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::FileDelete {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

// =============================================================================
// JSON Storage Implementation
// =============================================================================

/// JSON storage backend (default)
#[derive(Clone, Debug, Default)]
pub struct JsonStorage {
    /// Pretty print JSON output
    pretty: bool,
}

impl JsonStorage {
    /// Create a compact JSON storage backend
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Create a JSON storage backend with pretty printing enabled
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl StorageBackend for JsonStorage {
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(data).map_err(Error::from)
        } else {
            serde_json::to_string(data).map_err(Error::from)
        }
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &[u8]) -> Result<T> {
        serde_json::from_slice(content).map_err(Error::from)
    }
}

// =============================================================================
// Tests
// =============================================================================
