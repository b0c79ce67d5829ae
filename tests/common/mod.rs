//! Common test utilities for propstore integration tests
//!
//! Provides a temp directory with a parent/child store pair sharing a
//! private cache, plus helpers that touch property files behind the stores'
//! backs the way another process would.

#![allow(dead_code)]

use propstore::{PropertyCache, PropertyStore, StoreOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Options with short waits so failing paths finish quickly
pub fn fast_options() -> StoreOptions {
    StoreOptions::builder()
        .read_time_limit(Duration::from_millis(200))
        .read_retry_interval(Duration::from_millis(10))
        .lock_timeout(Duration::from_secs(30))
        .lock_poll_interval(Duration::from_millis(2))
        .build()
        .expect("valid options")
}

/// Temp directory with a `parent` store and a `child` inheriting from it
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub cache: Arc<PropertyCache>,
    pub parent: Arc<PropertyStore>,
    pub child: PropertyStore,
}

impl TestFixture {
    /// Create a fixture with the default cache validity window
    pub fn new() -> Self {
        Self::with_cache(PropertyCache::new())
    }

    /// Create a fixture whose cache re-validates on every read
    pub fn without_validity_window() -> Self {
        Self::with_cache(PropertyCache::with_validity_window(Duration::ZERO))
    }

    fn with_cache(cache: PropertyCache) -> Self {
        init_logging();
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cache = Arc::new(cache);

        let parent = Arc::new(
            PropertyStore::builder(temp_dir.path().join("properties/parent"))
                .options(fast_options())
                .cache(Arc::clone(&cache))
                .build(),
        );
        let child = PropertyStore::builder(temp_dir.path().join("properties/child"))
            .parent(Arc::clone(&parent))
            .options(fast_options())
            .cache(Arc::clone(&cache))
            .build();

        Self {
            temp_dir,
            cache,
            parent,
            child,
        }
    }

    /// Another store on the same file as `parent`, sharing the cache
    pub fn parent_twin(&self) -> PropertyStore {
        PropertyStore::builder(self.parent.path().to_path_buf())
            .options(fast_options())
            .cache(Arc::clone(&self.cache))
            .build()
    }

    /// A store on `name` with its own cache, like another process would have
    pub fn foreign_store(&self, name: &str) -> PropertyStore {
        PropertyStore::builder(self.temp_dir.path().join("properties").join(name))
            .options(fast_options())
            .cache(Arc::new(PropertyCache::new()))
            .build()
    }

    pub fn properties_dir(&self) -> PathBuf {
        self.temp_dir.path().join("properties")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Overwrite a property file directly, bypassing any store
pub fn raw_write(path: &Path, data: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, data).unwrap();
}

/// Overwrite a property file and push its mtime forward so the change is
/// detectable regardless of filesystem timestamp granularity
pub fn raw_write_detectable(path: &Path, data: &str) {
    raw_write(path, data);
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(60))
        .unwrap();
}

/// Delete a property file directly, bypassing any store
pub fn delete_file(path: &Path) {
    if path.exists() {
        fs::remove_file(path).unwrap();
    }
}

/// Parse a property file directly
pub fn read_file(path: &Path) -> Option<serde_json::Value> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}
