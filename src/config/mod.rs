//! Tunable options for property stores and file locks
//!
//! - `LockOptions` - Sentinel lock acquisition timeout and poll interval
//! - `StoreOptions` - Read retry policy, lock options and output format

mod types;

pub use types::{
    DEFAULT_LOCK_POLL_INTERVAL, DEFAULT_LOCK_TIMEOUT, DEFAULT_READ_RETRY_INTERVAL,
    DEFAULT_READ_TIME_LIMIT, LockOptions, StoreOptions, StoreOptionsBuilder,
};
