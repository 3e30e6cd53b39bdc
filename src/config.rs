//! Storage Configuration
//!
//! A [`Storage`](crate::Storage) is configured once, at construction, and the
//! configuration is immutable afterwards. There are two equivalent ways to
//! build one:
//!
//! - an ordered list of option functions ([`with_gc_interval`],
//!   [`with_entry_ttl`]), each touching a single field
//! - a [`StorageConfig`] value built with its `with_*` methods
//!
//! ```
//! use gcmap::{with_entry_ttl, with_gc_interval, StorageConfig};
//! use std::time::Duration;
//!
//! let config = StorageConfig::from_options([
//!     with_gc_interval(Duration::from_secs(30)),
//!     with_entry_ttl(Duration::from_secs(600)),
//! ]);
//! assert_eq!(config.gc_interval, Duration::from_secs(30));
//! assert_eq!(config.entry_ttl, Duration::from_secs(600));
//! ```

use std::fmt;
use std::time::Duration;

/// How often the sweeper scans for stale entries unless overridden.
pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// How long an entry may stay without being written before it is purged.
pub const DEFAULT_ENTRY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for a storage and its expiry sweeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageConfig {
    /// Interval between sweeps (default: 1 hour)
    pub gc_interval: Duration,

    /// Maximum age since the last write before an entry is purged (default: 24 hours)
    pub entry_ttl: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            gc_interval: DEFAULT_GC_INTERVAL,
            entry_ttl: DEFAULT_ENTRY_TTL,
        }
    }
}

impl StorageConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the defaults and applies `options` in order.
    ///
    /// Applying the same option twice is allowed; the last one wins.
    pub fn from_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = StorageOption>,
    {
        let mut config = Self::default();
        for option in options {
            option.apply(&mut config);
        }
        config
    }

    /// Sets the sweep interval. `Duration::ZERO` disables the sweeper.
    pub fn with_gc_interval(mut self, interval: Duration) -> Self {
        self.gc_interval = interval;
        self
    }

    /// Sets the entry TTL. `Duration::ZERO` disables expiry.
    pub fn with_entry_ttl(mut self, ttl: Duration) -> Self {
        self.entry_ttl = ttl;
        self
    }

    /// Returns true if a storage built from this config runs a sweeper.
    ///
    /// Both the interval and the TTL have to be non-zero.
    #[inline]
    pub fn sweeper_enabled(&self) -> bool {
        !self.gc_interval.is_zero() && !self.entry_ttl.is_zero()
    }
}

/// A single configuration step, applied to a [`StorageConfig`] at construction.
pub struct StorageOption(Box<dyn FnOnce(&mut StorageConfig) + Send>);

impl StorageOption {
    /// Wraps an arbitrary modification of the config.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut StorageConfig) + Send + 'static,
    {
        Self(Box::new(f))
    }

    /// Applies this option to `config`.
    pub fn apply(self, config: &mut StorageConfig) {
        (self.0)(config)
    }
}

impl fmt::Debug for StorageOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageOption").finish_non_exhaustive()
    }
}

/// Sets a custom sweep interval.
pub fn with_gc_interval(interval: Duration) -> StorageOption {
    StorageOption::new(move |config| config.gc_interval = interval)
}

/// Sets a custom TTL for entries.
pub fn with_entry_ttl(ttl: Duration) -> StorageOption {
    StorageOption::new(move |config| config.entry_ttl = ttl)
}
