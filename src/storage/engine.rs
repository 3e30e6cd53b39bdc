//! Thread-Safe Storage Engine with Idle Expiry
//!
//! This module implements the core storage engine for gcmap: a generic
//! HashMap behind a single reader/writer lock, where every entry remembers
//! when it was last written.
//!
//! ## Design Decisions
//!
//! 1. **One Lock**: A single `RwLock` guards the whole map. Every operation is
//!    atomic on its own and there is no lock ordering to get wrong.
//! 2. **Write Timestamps Only**: `last_update` is set by `store` and by a merging
//!    `store_or_update`. Reads never touch it.
//! 3. **No Lazy Expiry**: Reads never check the TTL. Stale entries are removed
//!    only by the background sweeper (or an explicit [`Storage::purge_stale`]).
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                  Storage<K, V>                │
//! │  ┌─────────────────────────────────────────┐  │
//! │  │ RwLock<HashMap<K, Slot<V>>>             │  │
//! │  │   load / range          -> read lock    │  │
//! │  │   store / update / del  -> write lock   │  │
//! │  └─────────────────────────────────────────┘  │
//! │                      ▲                        │
//! │                      │ write lock per pass    │
//! │              ┌───────┴────────┐               │
//! │              │ ExpirySweeper  │               │
//! │              └────────────────┘               │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Callbacks handed to [`Storage::store_or_update`] and [`Storage::range`]
//! run while the lock is held. They must not call back into the same storage:
//! the lock is not reentrant and such a call deadlocks.

use crate::config::{StorageConfig, StorageOption};
use crate::error::StorageResult;
use crate::storage::expiry::ExpirySweeper;
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::hash_map::{self, HashMap};
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// A stored value together with the time it was last written.
#[derive(Debug, Clone)]
pub(crate) struct Slot<V> {
    /// The caller's value
    pub(crate) value: V,
    /// Refreshed on every write, never on reads
    pub(crate) last_update: Instant,
}

impl<V> Slot<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            last_update: Instant::now(),
        }
    }

    /// Returns true if the entry has gone longer than `ttl` without a write.
    #[inline]
    fn is_stale(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_update) > ttl
    }
}

/// The state shared between a [`Storage`] and its sweeper.
pub(crate) struct Shared<K, V> {
    data: RwLock<HashMap<K, Slot<V>>>,

    entry_ttl: Duration,

    /// Statistics: total store operations
    store_count: AtomicU64,

    /// Statistics: total load operations
    load_count: AtomicU64,

    /// Statistics: total delete operations
    delete_count: AtomicU64,

    /// Statistics: entries removed for being stale
    purged_count: AtomicU64,

    /// Statistics: completed purge passes
    sweep_count: AtomicU64,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash,
{
    fn new(entry_ttl: Duration) -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            entry_ttl,
            store_count: AtomicU64::new(0),
            load_count: AtomicU64::new(0),
            delete_count: AtomicU64::new(0),
            purged_count: AtomicU64::new(0),
            sweep_count: AtomicU64::new(0),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Removes every entry whose last write is older than `now - entry_ttl`.
    ///
    /// Returns the number of entries removed. A zero TTL means expiry is
    /// disabled and nothing is removed.
    pub(crate) fn purge_stale(&self) -> usize {
        if self.entry_ttl.is_zero() {
            return 0;
        }

        let ttl = self.entry_ttl;
        let mut data = self.data.write();
        let now = Instant::now();
        let before = data.len();

        data.retain(|_, entry| !entry.is_stale(now, ttl));

        let purged = before - data.len();
        drop(data);

        self.sweep_count.fetch_add(1, Ordering::Relaxed);
        if purged > 0 {
            self.purged_count.fetch_add(purged as u64, Ordering::Relaxed);
        }

        purged
    }
}

/// A thread-safe key-value store whose entries expire after going unwritten
/// for longer than the configured TTL.
///
/// Expiry is based purely on the age since the last write. There is no
/// recency tracking on reads and no capacity bound.
///
/// # Thread Safety
///
/// All operations take `&self`. Share a storage between threads or tasks by
/// wrapping it in an `Arc`.
///
/// # Example
///
/// ```
/// use gcmap::{with_entry_ttl, Storage};
/// use std::time::Duration;
///
/// let storage: Storage<String, u32> =
///     Storage::new([with_entry_ttl(Duration::from_secs(60))]).unwrap();
///
/// storage.store("hits".to_string(), 1);
/// storage.store_or_update("hits".to_string(), 1, |old, new| old + new);
/// assert_eq!(storage.load("hits"), Some(2));
///
/// storage.delete("hits");
/// assert_eq!(storage.load("hits"), None);
/// ```
pub struct Storage<K, V> {
    shared: Arc<Shared<K, V>>,

    config: StorageConfig,

    /// Present when the configuration enables expiry
    sweeper: Option<ExpirySweeper>,
}

impl<K, V> fmt::Debug for Storage<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("len", &self.shared.len())
            .field("gc_interval", &self.config.gc_interval)
            .field("entry_ttl", &self.config.entry_ttl)
            .field("sweeping", &self.is_sweeping())
            .finish()
    }
}

impl<K, V> Storage<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Creates a storage from an ordered list of options applied over the defaults.
    ///
    /// The sweeper is started here when both the GC interval and the entry TTL
    /// are non-zero.
    pub fn new<I>(options: I) -> StorageResult<Self>
    where
        I: IntoIterator<Item = StorageOption>,
    {
        Self::with_config(StorageConfig::from_options(options))
    }

    /// Creates a storage from an explicit configuration.
    pub fn with_config(config: StorageConfig) -> StorageResult<Self> {
        let shared = Arc::new(Shared::new(config.entry_ttl));

        let sweeper = if config.sweeper_enabled() {
            Some(ExpirySweeper::start(Arc::clone(&shared), config.gc_interval)?)
        } else {
            debug!(
                gc_interval = ?config.gc_interval,
                entry_ttl = ?config.entry_ttl,
                "Expiry disabled, entries live until deleted"
            );
            None
        };

        Ok(Self {
            shared,
            config,
            sweeper,
        })
    }
}

impl<K, V> Storage<K, V>
where
    K: Eq + Hash,
{
    /// Sets the value for a key, replacing any previous value.
    ///
    /// # Returns
    ///
    /// Returns `true` if a new key was created, `false` if an existing key was updated.
    pub fn store(&self, key: K, value: V) -> bool {
        self.shared.store_count.fetch_add(1, Ordering::Relaxed);

        let mut data = self.shared.data.write();
        data.insert(key, Slot::new(value)).is_none()
    }

    /// Stores `value` if the key is absent, otherwise replaces the current value
    /// with `merge(&current, value)` and refreshes its timestamp.
    ///
    /// `merge` runs at most once, under the write lock. It must not access this
    /// storage. If it panics the stored value and its timestamp are left as they were.
    ///
    /// # Returns
    ///
    /// Returns `true` if a new key was created.
    pub fn store_or_update<F>(&self, key: K, value: V, merge: F) -> bool
    where
        F: FnOnce(&V, V) -> V,
    {
        self.shared.store_count.fetch_add(1, Ordering::Relaxed);

        let mut data = self.shared.data.write();
        match data.entry(key) {
            hash_map::Entry::Vacant(slot) => {
                slot.insert(Slot::new(value));
                true
            }
            hash_map::Entry::Occupied(slot) => {
                let current = slot.into_mut();
                current.value = merge(&current.value, value);
                current.last_update = Instant::now();
                false
            }
        }
    }

    /// Stores `value` only if the key is absent.
    ///
    /// An existing entry is left untouched, including its timestamp.
    ///
    /// # Returns
    ///
    /// Returns `true` if the value was stored.
    pub fn store_if_absent(&self, key: K, value: V) -> bool {
        self.shared.store_count.fetch_add(1, Ordering::Relaxed);

        let mut data = self.shared.data.write();
        match data.entry(key) {
            hash_map::Entry::Vacant(slot) => {
                slot.insert(Slot::new(value));
                true
            }
            hash_map::Entry::Occupied(_) => false,
        }
    }

    /// Returns a copy of the value for a key, or `None` if it is absent.
    ///
    /// The copy is taken under the read lock. Loading never refreshes the
    /// entry's timestamp.
    pub fn load<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.shared.load_count.fetch_add(1, Ordering::Relaxed);

        let data = self.shared.data.read();
        data.get(key).map(|entry| entry.value.clone())
    }

    /// Returns true if the key is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.data.read().contains_key(key)
    }

    /// Deletes a key. Deleting an absent key is a no-op.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key was deleted, `false` if it didn't exist.
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.delete_count.fetch_add(1, Ordering::Relaxed);

        let mut data = self.shared.data.write();
        data.remove(key).is_some()
    }

    /// Calls `visit` for each key and value present, in no particular order.
    ///
    /// Iteration stops as soon as `visit` returns `false`. The read lock is
    /// held for the whole walk, so a slow visitor stalls every writer, and
    /// calling a mutating operation from inside `visit` deadlocks.
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        let data = self.shared.data.read();
        for (key, entry) in data.iter() {
            if !visit(key, &entry.value) {
                break;
            }
        }
    }

    /// Runs one purge pass immediately, the same pass the sweeper runs on each tick.
    ///
    /// # Returns
    ///
    /// Returns the number of stale entries removed.
    pub fn purge_stale(&self) -> usize {
        self.shared.purge_stale()
    }

    /// Returns the number of entries, stale ones included until they are purged.
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Returns true if the storage holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns storage statistics.
    pub fn stats(&self) -> StorageStats {
        StorageStats {
            keys: self.len() as u64,
            store_ops: self.shared.store_count.load(Ordering::Relaxed),
            load_ops: self.shared.load_count.load(Ordering::Relaxed),
            delete_ops: self.shared.delete_count.load(Ordering::Relaxed),
            purged: self.shared.purged_count.load(Ordering::Relaxed),
            sweeps: self.shared.sweep_count.load(Ordering::Relaxed),
        }
    }
}

impl<K, V> Storage<K, V> {
    /// Returns the configuration this storage was built with.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Returns true while the background sweeper is running.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .as_ref()
            .is_some_and(|sweeper| sweeper.is_running())
    }

    /// Stops the background sweeper. Entries are no longer purged afterwards.
    ///
    /// Calling this more than once, or on a storage without a sweeper, is a no-op.
    /// Dropping the storage stops the sweeper as well.
    pub fn stop_sweeper(&self) {
        if let Some(sweeper) = &self.sweeper {
            sweeper.stop();
        }
    }
}

/// Storage statistics snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of entries currently stored
    pub keys: u64,
    /// Total store, store_or_update and store_if_absent calls
    pub store_ops: u64,
    /// Total load calls
    pub load_ops: u64,
    /// Total delete calls
    pub delete_ops: u64,
    /// Entries removed for being stale
    pub purged: u64,
    /// Completed purge passes
    pub sweeps: u64,
}
