//! Exclusive sentinel lock and its RAII guard.

use super::lock_path_for;
use crate::config::LockOptions;
use crate::error::{Error, Result};
use crate::layout::normalize_path;
use log::{debug, error, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

/// Exclusive lock over a single file path.
///
/// # Example
///
/// ```rust,no_run
/// use propstore::FileLock;
///
/// let lock = FileLock::new("/shared/props/shot_010.json");
/// let value = lock.run(|| {
///     // read, modify and write the file here
///     Ok(42)
/// })?;
/// # Ok::<(), propstore::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileLock {
    /// Normalized target file path
    path: PathBuf,

    /// Sentinel directory guarding `path`
    sentinel: PathBuf,

    options: LockOptions,
}

impl FileLock {
    /// Create a lock for `path` with the default timeout (5s) and poll interval (0.5s)
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_options(path, LockOptions::default())
    }

    /// Create a lock for `path` with explicit options
    pub fn with_options(path: impl AsRef<Path>, options: LockOptions) -> Self {
        let path = normalize_path(path.as_ref());
        let sentinel = lock_path_for(&path);
        Self {
            path,
            sentinel,
            options,
        }
    }

    /// The file this lock protects
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The sentinel directory representing the held lock
    pub fn sentinel_path(&self) -> &Path {
        &self.sentinel
    }

    /// Block until the sentinel is created or the timeout elapses.
    ///
    /// Only a successful acquisition creates the sentinel, so a timed-out
    /// caller leaves nothing behind.
    ///
    /// # Errors
    ///
    /// * `Error::LockTimeout` - Another holder kept the lock for the whole timeout
    /// * `Error::LockAcquire` - The sentinel could not be created for another
    ///   reason (missing parent directory, permissions)
    pub fn acquire(&self) -> Result<LockGuard> {
        let start = Instant::now();
        loop {
            match fs::create_dir(&self.sentinel) {
                Ok(()) => {
                    debug!("Acquired lock {}", self.sentinel.display());
                    return Ok(LockGuard::new(self.sentinel.clone()));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => {
                    error!(
                        "Could not create lock sentinel {}: {e}",
                        self.sentinel.display()
                    );
                    return Err(Error::LockAcquire {
                        path: self.sentinel.clone(),
                        source: e,
                    });
                }
            }

            let waited = start.elapsed();
            if waited >= self.options.timeout {
                error!("Could not lock file {}", self.path.display());
                return Err(Error::LockTimeout {
                    path: self.path.clone(),
                    waited,
                });
            }
            thread::sleep(self.options.poll_interval.min(self.options.timeout - waited));
        }
    }

    /// Run `f` while holding the lock.
    ///
    /// The sentinel is removed on every exit path, including errors and
    /// panics unwinding through `f`.
    pub fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let _guard = self.acquire()?;
        f()
    }
}

/// RAII guard for a held sentinel lock.
///
/// When dropped, the sentinel directory is removed. If removal fails a
/// warning is logged and nothing else happens, so the outcome of the guarded
/// operation is never replaced by a release failure.
#[derive(Debug)]
pub struct LockGuard {
    /// Path to the sentinel directory
    sentinel: PathBuf,

    /// Whether the lock has been released manually
    released: bool,
}

impl LockGuard {
    fn new(sentinel: PathBuf) -> Self {
        Self {
            sentinel,
            released: false,
        }
    }

    /// Get the path to the sentinel directory
    pub fn path(&self) -> &Path {
        &self.sentinel
    }

    /// Release the lock before the guard goes out of scope
    pub fn release(mut self) {
        self.remove_sentinel();
        self.released = true;
    }

    fn remove_sentinel(&self) {
        match fs::remove_dir(&self.sentinel) {
            Ok(()) => debug!("Released lock {}", self.sentinel.display()),
            Err(e) => warn!(
                "Could not delete lock sentinel {}: {e}",
                self.sentinel.display()
            ),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released {
            self.remove_sentinel();
        }
    }
}
