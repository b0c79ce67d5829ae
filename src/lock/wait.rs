//! Wait-only lock: waits out a writer without excluding anyone.

use super::lock_path_for;
use crate::config::LockOptions;
use crate::layout::normalize_path;
use log::debug;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

/// Waits for a [`FileLock`](super::FileLock) holder to finish.
///
/// Never creates a sentinel itself. After [`wait`](WaitLock::wait) returns,
/// another writer may already have started, so use it only where slightly
/// stale data is acceptable.
#[derive(Debug, Clone)]
pub struct WaitLock {
    path: PathBuf,
    sentinel: PathBuf,
    options: LockOptions,
}

impl WaitLock {
    /// Create a wait lock for `path` with default options
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_options(path, LockOptions::default())
    }

    /// Create a wait lock for `path` with explicit options
    pub fn with_options(path: impl AsRef<Path>, options: LockOptions) -> Self {
        let path = normalize_path(path.as_ref());
        let sentinel = lock_path_for(&path);
        Self {
            path,
            sentinel,
            options,
        }
    }

    /// The file whose writers this lock waits for
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait up to the timeout for the sentinel to disappear.
    ///
    /// Returns `true` if the file was unlocked when the wait ended, `false` if
    /// the timeout elapsed first. Either way the caller proceeds.
    pub fn wait(&self) -> bool {
        let start = Instant::now();
        loop {
            if !self.sentinel.exists() {
                return true;
            }
            let waited = start.elapsed();
            if waited >= self.options.timeout {
                debug!(
                    "Gave up waiting for lock {} after {waited:?}",
                    self.sentinel.display()
                );
                return false;
            }
            thread::sleep(self.options.poll_interval.min(self.options.timeout - waited));
        }
    }

    /// Wait, then run `f` regardless of the wait outcome
    pub fn run<T, F>(&self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.wait();
        f()
    }
}
