use crate::PropertyMap;
use crate::error::{Error, Result};
use crate::lock::{FileLock, WaitLock};
use crate::storage::StorageBackend;
use crate::store::PropertyStore;

use log::{debug, error, info};
use serde_json::Value;
use std::thread;
use std::time::Instant;

impl PropertyStore {
    /// Update one own property and return the resulting own map.
    ///
    /// Use [`update_dict`](Self::update_dict) for several keys at once.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidKey` - The key is empty or not ASCII
    /// * `Error::LockTimeout` - Another writer held the file lock too long
    /// * `Error::PropertyRead` - The current file stayed unparsable
    /// * `Error::FileWrite` / `Error::DirectoryCreate` - The write failed
    pub fn update(&self, key: &str, value: impl Into<Value>) -> Result<PropertyMap> {
        let mut partial = PropertyMap::new();
        partial.insert(key.to_string(), value.into());
        self.update_dict(partial)
    }

    /// Merge `partial` over the own properties and return the resulting own map.
    ///
    /// All keys are checked before the lock is taken, so a rejected call
    /// leaves the file untouched. Inside the lock the file is
    /// re-read from disk, never from the cache.
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update).
    pub fn update_dict(&self, partial: PropertyMap) -> Result<PropertyMap> {
        for key in partial.keys() {
            self.check_key(key, "update")?;
        }

        let keys: Vec<String> = partial.keys().cloned().collect();
        let current = self.mutate(move |own| own.extend(partial))?;
        info!(
            "Updated properties {keys:?} in {}",
            self.path.display()
        );
        Ok(current)
    }

    /// Remove one own property and return the resulting own map.
    ///
    /// Removing an absent key is not an error. An inherited value with the
    /// same key becomes visible again.
    pub fn remove(&self, key: &str) -> Result<PropertyMap> {
        self.check_key(key, "remove")?;

        let current = self.mutate(|own| {
            own.remove(key);
        })?;
        info!("Removed property {key:?} from {}", self.path.display());
        Ok(current)
    }

    /// Delete this store's property file regardless of its content.
    ///
    /// Parent properties are untouched, so inherited values stay visible.
    pub fn clear(&self) -> Result<()> {
        self.ensure_parent_dir()?;

        // The content is never parsed, so a corrupt file can still be cleared
        FileLock::with_options(&self.path, self.options.lock)
            .run(|| self.storage.delete(&self.path))?;

        self.cache.set(&self.path, PropertyMap::new());
        info!("Cleared properties in {}", self.path.display());
        Ok(())
    }

    /// Authoritative re-read of the own properties.
    ///
    /// Drops this file's cache entry, waits for an in-flight writer to
    /// finish (without locking out others), then reads through to disk.
    pub fn reload(&self) -> Result<PropertyMap> {
        self.cache.remove(&self.path);
        if !WaitLock::with_options(&self.path, self.options.lock).wait() {
            debug!(
                "Reloading {} while another writer still holds it",
                self.path.display()
            );
        }

        let own = self.read_from_disk()?;
        self.cache.set(&self.path, own.clone());
        Ok(own)
    }

    /// Locked read-modify-write of the own map.
    ///
    /// An empty result deletes the file; there is never an empty file on disk.
    fn mutate<F>(&self, change: F) -> Result<PropertyMap>
    where
        F: FnOnce(&mut PropertyMap),
    {
        self.ensure_parent_dir()?;

        let lock = FileLock::with_options(&self.path, self.options.lock);
        let own = lock.run(|| {
            let mut own = self.read_from_disk()?;
            change(&mut own);
            self.persist(&own)?;
            Ok(own)
        })?;

        self.cache.set(&self.path, own.clone());
        Ok(own)
    }

    fn persist(&self, own: &PropertyMap) -> Result<()> {
        if own.is_empty() {
            debug!("Deleting empty property file {}", self.path.display());
            return self.storage.delete(&self.path);
        }

        self.storage.write(&self.path, own).inspect_err(|e| {
            error!("Property file write error {}: {e}", self.path.display());
        })
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.exists() => {
                std::fs::create_dir_all(parent).map_err(|e| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })
            }
            _ => Ok(()),
        }
    }

    /// Read the own map from disk, bypassing the cache.
    ///
    /// No lock is taken. A parse failure (including invalid UTF-8) is taken
    /// as a concurrent write in progress and retried until the read time
    /// limit elapses.
    pub(crate) fn read_from_disk(&self) -> Result<PropertyMap> {
        let limit = self.options.read_time_limit;
        let start = Instant::now();

        loop {
            // Missing file, either from the start or deleted between attempts
            let Some(content) = self.storage.read_raw(&self.path)? else {
                return Ok(PropertyMap::new());
            };

            let failure = match self.storage.deserialize::<PropertyMap>(&content) {
                Ok(own) => return Ok(own),
                Err(Error::Serialize(e)) => e.to_string(),
                Err(other) => return Err(other),
            };

            let waited = start.elapsed();
            if waited >= limit {
                error!(
                    "Failed reading property file {}: {failure}",
                    self.path.display()
                );
                return Err(Error::PropertyRead {
                    path: self.path.clone(),
                    reason: failure,
                });
            }

            debug!(
                "Property file {} unreadable ({failure}), retrying",
                self.path.display()
            );
            thread::sleep(self.options.read_retry_interval.min(limit - waited));
        }
    }
}
