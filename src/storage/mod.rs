//! Storage Engine Module
//!
//! This module provides the core storage functionality for gcmap: a
//! thread-safe key-value map whose entries carry a last-write timestamp, and
//! the background sweeper that purges entries gone stale.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 Storage<K, V>               │
//! │      RwLock<HashMap<K, Slot<V>>>            │
//! └─────────────────────────────────────────────┘
//!                        ▲
//!                        │
//!          ┌─────────────┴─────────────┐
//!          │       ExpirySweeper       │
//!          │  (own thread and runtime) │
//!          └───────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use gcmap::storage::Storage;
//! use gcmap::{with_entry_ttl, with_gc_interval};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let storage = Arc::new(
//!     Storage::new([
//!         with_gc_interval(Duration::from_secs(60)),
//!         with_entry_ttl(Duration::from_secs(3600)),
//!     ])
//!     .unwrap(),
//! );
//!
//! storage.store("session", "token123");
//! assert_eq!(storage.load("session"), Some("token123"));
//! ```

pub mod engine;
mod expiry;

// Re-export commonly used types
pub use engine::{Storage, StorageStats};
