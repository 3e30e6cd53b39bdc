//! # gcmap - A Thread-Safe In-Memory Store with Idle Expiry
//!
//! gcmap is a generic key-value store meant as a building block for caching
//! layers inside larger services: memoizing expensive lookups, deduplicating
//! work, and the like. Callers get safe concurrent access without any locking
//! of their own.
//!
//! ## Features
//!
//! - **Generic**: any `Eq + Hash` key, any value type
//! - **Atomic Operations**: every operation runs under a single reader/writer lock
//! - **Merge on Write**: [`Storage::store_or_update`] combines the old and new
//!   value under the lock
//! - **Idle Expiry**: entries not written for `entry_ttl` are purged by a
//!   background sweeper every `gc_interval`
//!
//! Expiry is driven only by the age since the last write. Reads do not keep
//! an entry alive and there is no size limit, so this is not an LRU cache.
//!
//! ## Quick Start
//!
//! ```
//! use gcmap::{with_entry_ttl, with_gc_interval, Storage};
//! use std::time::Duration;
//!
//! let storage = Storage::new([
//!     with_gc_interval(Duration::from_secs(60)),
//!     with_entry_ttl(Duration::from_secs(10 * 60)),
//! ])
//! .unwrap();
//!
//! storage.store("a", 1);
//! storage.store_or_update("a", 41, |old, new| old + new);
//! assert_eq!(storage.load("a"), Some(42));
//!
//! let mut keys = 0;
//! storage.range(|_, _| {
//!     keys += 1;
//!     true
//! });
//! assert_eq!(keys, 1);
//! ```
//!
//! ## Configuration
//!
//! | Option             | Default  | Zero means            |
//! |--------------------|----------|-----------------------|
//! | `with_gc_interval` | 1 hour   | no sweeper            |
//! | `with_entry_ttl`   | 24 hours | no sweeper, no expiry |
//!
//! ## Module Overview
//!
//! - [`config`]: configuration values and option functions
//! - [`storage`]: the storage engine and its expiry sweeper
//! - [`error`]: construction errors

pub mod config;
pub mod error;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::{
    with_entry_ttl, with_gc_interval, StorageConfig, StorageOption, DEFAULT_ENTRY_TTL,
    DEFAULT_GC_INTERVAL,
};
pub use error::{StorageError, StorageResult};
pub use storage::{Storage, StorageStats};

/// Version of gcmap
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
