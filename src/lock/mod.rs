//! Cross-process file locking with directory sentinels.
//!
//! A lock on `dir/foo.json` is the existence of the directory
//! `dir/.lock_foo.json`. Directory creation is atomic on local disks and on
//! common network shares, so this works where OS advisory locks do not.
//!
//! # Lock Kinds
//!
//! - [`FileLock`] creates the sentinel and excludes every other holder until
//!   its [`LockGuard`] is dropped.
//! - [`WaitLock`] only waits for the sentinel to disappear. It never creates
//!   one, so a writer may start right after the wait returns.
//!
//! There is no owner identity and no reentrancy: locking the same path twice
//! from one thread deadlocks until the timeout.

mod exclusive;
mod wait;

pub use exclusive::{FileLock, LockGuard};
pub use wait::WaitLock;

use crate::layout::normalize_path;
use std::path::{Path, PathBuf};

/// Prefix prepended to the target file name to form the sentinel name
pub const LOCK_PREFIX: &str = ".lock_";

/// Sentinel directory path for a target file
pub fn lock_path_for(path: &Path) -> PathBuf {
    let path = normalize_path(path);
    let mut name = std::ffi::OsString::from(LOCK_PREFIX);
    if let Some(file_name) = path.file_name() {
        name.push(file_name);
    }
    path.with_file_name(name)
}

/// Whether a sentinel currently exists for `path`
///
/// Not atomic with anything that follows; use it for diagnostics only.
pub fn is_locked(path: &Path) -> bool {
    lock_path_for(path).exists()
}
