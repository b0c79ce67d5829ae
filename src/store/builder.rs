//! Builder for PropertyStore
//!
//! This module contains [`PropertyStoreBuilder`] which provides a fluent API
//! for creating a [`PropertyStore`](super::PropertyStore).

use crate::cache::PropertyCache;
use crate::config::StoreOptions;
use crate::layout::{PropertyLocation, normalize_path};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::PropertyStore;

/// Builder for creating a [`PropertyStore`] with a fluent API.
///
/// # Example
///
/// ```rust,no_run
/// use propstore::{PropertyCache, PropertyStore};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let project = Arc::new(PropertyStore::new("/shared/props/project.json"));
/// let asset = PropertyStore::builder("/shared/props/asset_chair.json")
///     .parent(project)
///     .read_time_limit(Duration::from_secs(1))
///     .cache(Arc::new(PropertyCache::new()))
///     .build();
/// ```
pub struct PropertyStoreBuilder {
    path: PathBuf,
    parent: Option<Arc<PropertyStore>>,
    options: StoreOptions,
    cache: Option<Arc<PropertyCache>>,
}

impl PropertyStoreBuilder {
    /// Create a builder for the property file at `location`
    pub fn new(location: impl PropertyLocation) -> Self {
        Self {
            path: location.property_file_path(),
            parent: None,
            options: StoreOptions::default(),
            cache: None,
        }
    }

    /// Inherit properties from `parent`
    pub fn parent(mut self, parent: Arc<PropertyStore>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Replace all options
    pub fn options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// How long to keep retrying an unparsable property file (default: 3s)
    pub fn read_time_limit(mut self, limit: Duration) -> Self {
        self.options.read_time_limit = limit;
        self
    }

    /// How long writes wait for the file lock (default: 5s)
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.options.lock.timeout = timeout;
        self
    }

    /// Use `cache` instead of the process-wide cache
    pub fn cache(mut self, cache: Arc<PropertyCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build the store. Nothing is read or written yet.
    pub fn build(self) -> PropertyStore {
        let storage = self.options.storage();
        PropertyStore {
            path: normalize_path(&self.path),
            parent: self.parent,
            options: self.options,
            storage,
            cache: self.cache.unwrap_or_else(PropertyCache::global),
        }
    }
}
