//! Staleness-bounded cache of property file snapshots
//!
//! One entry per absolute property file path. Within the validity window a
//! cached snapshot is returned without touching the disk; after it, the
//! file's modification time decides whether the snapshot is still good.
//! Edits made through a store are always visible to that process because
//! writes refresh the entry synchronously. Edits made by other processes
//! become visible after at most one validity window.

use crate::PropertyMap;
use crate::error::{Error, Result};
use crate::sync::{MutexExt, RwLockExt};
use log::{debug, error};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::{Duration, Instant, SystemTime};

/// Default time a validated snapshot is trusted without a disk check
pub const DEFAULT_VALIDITY_WINDOW: Duration = Duration::from_secs(20);

static GLOBAL_CACHE: OnceLock<Arc<PropertyCache>> = OnceLock::new();

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: PropertyMap,

    /// Modification time of the file the snapshot came from; `None` when the
    /// snapshot records that there is no file
    source_mtime: Option<SystemTime>,

    /// Local monotonic time of the last validation. Never compared with
    /// file timestamps, which come from the file server's clock.
    validated_at: Instant,

    /// Bumped on every `set`, so a re-validation can tell whether the entry
    /// was replaced while the file was being stat'ed
    generation: u64,
}

/// Shared cache of own-property snapshots, keyed by file path.
///
/// Stores share one cache through an `Arc`. [`PropertyCache::global`] is the
/// process-wide instance stores use unless another one is injected; tests
/// and tools that need isolation build their own with [`PropertyCache::new`].
#[derive(Debug)]
pub struct PropertyCache {
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
    validity_window: RwLock<Duration>,
    next_generation: AtomicU64,
}

impl Default for PropertyCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyCache {
    /// Create an empty cache with the default validity window (20s)
    pub fn new() -> Self {
        Self::with_validity_window(DEFAULT_VALIDITY_WINDOW)
    }

    /// Create an empty cache with a custom validity window
    pub fn with_validity_window(window: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            validity_window: RwLock::new(window),
            next_generation: AtomicU64::new(0),
        }
    }

    /// The process-wide cache.
    ///
    /// Initialized on first use. It lives for the rest of the process;
    /// [`clear`](Self::clear) is its reset operation.
    pub fn global() -> Arc<PropertyCache> {
        Arc::clone(GLOBAL_CACHE.get_or_init(|| Arc::new(PropertyCache::new())))
    }

    /// Current validity window
    pub fn validity_window(&self) -> Duration {
        *self.validity_window.read_recovered()
    }

    /// Change the validity window. Applies to existing entries too.
    pub fn set_validity_window(&self, window: Duration) {
        *self.validity_window.write_recovered() = window;
    }

    /// Look up the snapshot for `path`.
    ///
    /// Returns `Ok(None)` on a miss, in which case the caller reads the file
    /// and calls [`set`](Self::set). A file that disappeared is remembered
    /// as an empty snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileRead` if the file exists but cannot be stat'ed.
    pub fn get(&self, path: &Path) -> Result<Option<PropertyMap>> {
        let window = self.validity_window();

        let (snapshot, source_mtime, generation) = {
            let entries = self.entries.lock_recovered();
            let Some(entry) = entries.get(path) else {
                debug!("Property cache miss: {}", path.display());
                return Ok(None);
            };
            if entry.validated_at.elapsed() < window {
                return Ok(Some(entry.snapshot.clone()));
            }
            (entry.snapshot.clone(), entry.source_mtime, entry.generation)
        };

        // Stat outside the table mutex; the result is committed only if the
        // entry was not replaced in the meantime.
        let mtime = match std::fs::metadata(path).and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Property file deleted externally: {}", path.display());
                self.commit_if_current(path, generation, |entries| {
                    entries.insert(path.to_path_buf(), self.empty_entry());
                });
                return Ok(Some(PropertyMap::new()));
            }
            Err(e) => {
                error!("Unknown cache read error {}: {e}", path.display());
                return Err(Error::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        if source_mtime == Some(mtime) {
            self.commit_if_current(path, generation, |entries| {
                if let Some(entry) = entries.get_mut(path) {
                    entry.validated_at = Instant::now();
                }
            });
            Ok(Some(snapshot))
        } else {
            debug!("Property file modified externally: {}", path.display());
            self.commit_if_current(path, generation, |entries| {
                entries.remove(path);
            });
            Ok(None)
        }
    }

    /// Record `snapshot` as the current content of `path`.
    ///
    /// A non-empty snapshot captures the file's modification time; an empty
    /// one records that there is no file.
    pub fn set(&self, path: &Path, snapshot: PropertyMap) {
        let source_mtime = if snapshot.is_empty() {
            None
        } else {
            match std::fs::metadata(path).and_then(|m| m.modified()) {
                Ok(mtime) => Some(mtime),
                Err(e) => {
                    // Forces a reload at the next validation
                    debug!("Could not stat {} for cache: {e}", path.display());
                    None
                }
            }
        };

        let entry = CacheEntry {
            snapshot,
            source_mtime,
            validated_at: Instant::now(),
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
        };
        self.entries
            .lock_recovered()
            .insert(path.to_path_buf(), entry);
    }

    /// Drop the entry for `path`
    pub fn remove(&self, path: &Path) {
        self.entries.lock_recovered().remove(path);
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.lock_recovered().clear();
    }

    /// Whether an entry exists for `path`
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.lock_recovered().contains_key(path)
    }

    /// Number of cached paths
    pub fn len(&self) -> usize {
        self.entries.lock_recovered().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn empty_entry(&self) -> CacheEntry {
        CacheEntry {
            snapshot: PropertyMap::new(),
            source_mtime: None,
            validated_at: Instant::now(),
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
        }
    }

    fn commit_if_current<F>(&self, path: &Path, generation: u64, apply: F)
    where
        F: FnOnce(&mut HashMap<PathBuf, CacheEntry>),
    {
        let mut entries = self.entries.lock_recovered();
        if entries
            .get(path)
            .is_some_and(|entry| entry.generation == generation)
        {
            apply(&mut entries);
        }
    }
}
