//! Property store module
//!
//! This module contains [`PropertyStore`], the per-entity key-value holder
//! backed by one JSON file and inheriting from an optional parent store.

mod builder;
mod io;

pub use builder::PropertyStoreBuilder;

use crate::PropertyMap;
use crate::cache::PropertyCache;
use crate::config::StoreOptions;
use crate::error::{Error, Result};
use crate::layout::PropertyLocation;
use crate::lock;
use crate::storage::JsonStorage;

use log::error;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File-backed property holder with inheritance.
///
/// Own properties live in a single JSON object file; a missing file means
/// "no properties". Reads go through the shared [`PropertyCache`] and never
/// take a lock. Writes lock the file with a directory sentinel, re-read it
/// from disk, merge, write the complete file, and refresh the cache.
///
/// Own keys always shadow inherited keys of the same name, all the way up
/// the parent chain. Parents are fixed at construction, so a chain cannot
/// form a cycle.
///
/// # Example
///
/// ```rust,no_run
/// use propstore::PropertyStore;
/// use std::sync::Arc;
///
/// let show = Arc::new(PropertyStore::new("/shared/props/show.json"));
/// let shot = PropertyStore::builder("/shared/props/shot_010.json")
///     .parent(Arc::clone(&show))
///     .build();
///
/// show.update("frame_rate", 24)?;
/// shot.update("frame_end", 1100)?;
///
/// assert_eq!(shot.get("frame_rate")?, Some(serde_json::json!(24)));
/// assert_eq!(shot.get_without_inheritance("frame_rate")?, None);
/// # Ok::<(), propstore::Error>(())
/// ```
#[derive(Debug)]
pub struct PropertyStore {
    /// Absolute, normalized property file path
    pub(crate) path: PathBuf,

    /// Store this one inherits from
    pub(crate) parent: Option<Arc<PropertyStore>>,

    pub(crate) options: StoreOptions,

    pub(crate) storage: JsonStorage,

    /// Snapshot cache shared with every other store using the same handle
    pub(crate) cache: Arc<PropertyCache>,
}

impl PropertyStore {
    /// Create a parentless store with default options and the global cache
    pub fn new(location: impl PropertyLocation) -> Self {
        Self::builder(location).build()
    }

    /// Create a builder for a store at `location`
    pub fn builder(location: impl PropertyLocation) -> PropertyStoreBuilder {
        PropertyStoreBuilder::new(location)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The property file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parent store, if any
    pub fn parent(&self) -> Option<&Arc<PropertyStore>> {
        self.parent.as_ref()
    }

    /// The options this store was built with
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// The cache handle this store reads through
    pub fn cache(&self) -> &Arc<PropertyCache> {
        &self.cache
    }

    /// Whether a writer currently holds the file lock (diagnostics only)
    pub fn is_locked(&self) -> bool {
        lock::is_locked(&self.path)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get the effective value for `key`, including inherited properties.
    ///
    /// Call [`get_dict`](Self::get_dict) once instead when reading many keys.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidKey` - The key is empty or not ASCII
    /// * `Error::PropertyRead` - A file in the chain stayed unparsable
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        self.check_key(key, "get")?;
        Ok(self.get_dict()?.remove(key))
    }

    /// Like [`get`](Self::get), returning `default` when the key is absent
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Result<Value> {
        Ok(self.get(key)?.unwrap_or_else(|| default.into()))
    }

    /// Get a value from this store's own file only
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_without_inheritance(&self, key: &str) -> Result<Option<Value>> {
        self.check_key(key, "get")?;
        Ok(self.get_dict_without_inheritance()?.remove(key))
    }

    /// Like [`get_without_inheritance`](Self::get_without_inheritance), with a default
    pub fn get_without_inheritance_or(
        &self,
        key: &str,
        default: impl Into<Value>,
    ) -> Result<Value> {
        Ok(self
            .get_without_inheritance(key)?
            .unwrap_or_else(|| default.into()))
    }

    /// Get a value and deserialize it into `T`
    ///
    /// # Errors
    ///
    /// Returns `Error::TypeMismatch` if the stored value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.get(key)? else {
            return Ok(None);
        };
        let actual = json_type_name(&value);
        serde_json::from_value(value)
            .map(Some)
            .map_err(|_| Error::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>().to_string(),
                actual: actual.to_string(),
            })
    }

    /// Whether `key` resolves to a value, including inherited properties
    pub fn contains_key(&self, key: &str) -> Result<bool> {
        self.check_key(key, "get")?;
        Ok(self.get_dict()?.contains_key(key))
    }

    /// All effective keys, including inherited ones, in sorted order
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.get_dict()?.into_iter().map(|(key, _)| key).collect())
    }

    /// The merged map: parent chain first, own properties on top
    pub fn get_dict(&self) -> Result<PropertyMap> {
        let own = self.get_dict_without_inheritance()?;
        match &self.parent {
            None => Ok(own),
            Some(parent) => {
                let mut merged = parent.get_dict()?;
                merged.extend(own);
                Ok(merged)
            }
        }
    }

    /// This store's own properties, served from the cache when possible
    ///
    /// Returns a copy; mutating it does not affect the cache.
    pub fn get_dict_without_inheritance(&self) -> Result<PropertyMap> {
        if let Some(snapshot) = self.cache.get(&self.path)? {
            return Ok(snapshot);
        }

        let own = self.read_from_disk()?;
        self.cache.set(&self.path, own.clone());
        Ok(own)
    }

    // =========================================================================
    // Cache control
    // =========================================================================

    /// Drop every entry of the process-wide cache.
    ///
    /// The next read from any store built with the default cache goes to
    /// disk. Stores given a private cache through
    /// [`PropertyStoreBuilder::cache`] are not affected; clear those with
    /// `store.cache().clear()`.
    pub fn clear_all_caches() {
        PropertyCache::global().clear();
        log::info!("Property caches cleared");
    }

    /// Keys must be non-empty ASCII strings. A violation is a caller bug.
    pub(crate) fn check_key(&self, key: &str, operation: &str) -> Result<()> {
        let reason = if key.is_empty() {
            "key must not be empty"
        } else if !key.is_ascii() {
            "key must be ASCII"
        } else {
            return Ok(());
        };

        error!(
            "Bug found. Tried to {operation} a property with key {key:?} on file {}: {reason}",
            self.path.display()
        );
        Err(Error::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
