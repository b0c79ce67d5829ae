//! Option types for propstore

use crate::error::{Error, Result};
use crate::storage::JsonStorage;
use std::time::Duration;

/// Default time to keep retrying a sentinel lock before giving up
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Default sleep between two sentinel creation attempts
pub const DEFAULT_LOCK_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default time to keep retrying an unparsable property file
pub const DEFAULT_READ_TIME_LIMIT: Duration = Duration::from_secs(3);

/// Default sleep between two property file read attempts
pub const DEFAULT_READ_RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Options for acquiring a sentinel lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOptions {
    /// Give up acquiring after this long
    pub timeout: Duration,

    /// Sleep between two acquisition attempts
    pub poll_interval: Duration,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_LOCK_TIMEOUT,
            poll_interval: DEFAULT_LOCK_POLL_INTERVAL,
        }
    }
}

impl LockOptions {
    /// Create lock options with the default timeout and poll interval
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the acquisition timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Options shared by a `PropertyStore`
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Keep retrying an unparsable property file for this long
    pub read_time_limit: Duration,

    /// Sleep between two read attempts
    pub read_retry_interval: Duration,

    /// Lock options used by update/remove/clear
    pub lock: LockOptions,

    /// Pretty print written property files
    pub pretty_json: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            read_time_limit: DEFAULT_READ_TIME_LIMIT,
            read_retry_interval: DEFAULT_READ_RETRY_INTERVAL,
            lock: LockOptions::default(),
            pretty_json: false,
        }
    }
}

impl StoreOptions {
    /// Create a new builder for StoreOptions
    ///
    /// # Example
    /// ```rust
    /// use propstore::StoreOptions;
    /// use std::time::Duration;
    ///
    /// let options = StoreOptions::builder()
    ///     .read_time_limit(Duration::from_secs(1))
    ///     .lock_timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(options.lock.timeout, Duration::from_secs(10));
    /// ```
    pub fn builder() -> StoreOptionsBuilder {
        StoreOptionsBuilder::new()
    }

    /// Storage backend matching these options
    pub(crate) fn storage(&self) -> JsonStorage {
        if self.pretty_json {
            JsonStorage::pretty()
        } else {
            JsonStorage::new()
        }
    }
}

/// Builder for creating StoreOptions with a fluent API
#[derive(Debug, Clone, Default)]
pub struct StoreOptionsBuilder {
    options: StoreOptions,
}

impl StoreOptionsBuilder {
    /// Create a new builder starting from the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// How long to keep retrying a property file that fails to parse (default: 3s)
    pub fn read_time_limit(mut self, limit: Duration) -> Self {
        self.options.read_time_limit = limit;
        self
    }

    /// Sleep between read attempts (default: 0.5s)
    pub fn read_retry_interval(mut self, interval: Duration) -> Self {
        self.options.read_retry_interval = interval;
        self
    }

    /// How long update/remove/clear wait for the file lock (default: 5s)
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.options.lock.timeout = timeout;
        self
    }

    /// Sleep between lock attempts (default: 0.5s)
    pub fn lock_poll_interval(mut self, interval: Duration) -> Self {
        self.options.lock.poll_interval = interval;
        self
    }

    /// Pretty print written property files
    pub fn pretty_json(mut self, pretty: bool) -> Self {
        self.options.pretty_json = pretty;
        self
    }

    /// Build the StoreOptions
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the read retry interval is zero while a
    /// read time limit is set, which would spin on a corrupt file.
    pub fn build(self) -> Result<StoreOptions> {
        let options = self.options;
        if options.read_retry_interval.is_zero() && !options.read_time_limit.is_zero() {
            return Err(Error::Config(
                "read retry interval must be greater than 0".into(),
            ));
        }
        Ok(options)
    }
}
