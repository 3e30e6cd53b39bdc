//! Background Expiry Sweeper
//!
//! Reads and writes never look at entry ages. Instead, a single background
//! task wakes up every `gc_interval`, takes the write lock once and removes
//! every entry that has not been written for longer than `entry_ttl`.
//!
//! ## Where It Runs
//!
//! The sweeper always gets its own thread driving a private current-thread
//! runtime, whether or not the storage is built inside a Tokio runtime. It is
//! never starved by a caller's blocking code, never dies with a caller's
//! runtime, and does not depend on the caller having enabled timers.
//!
//! ## Guarantees
//!
//! An entry last written at `t` is present at any time before `t + entry_ttl`
//! and gone by `t + entry_ttl + gc_interval`, give or take scheduling delay.
//!
//! The sweeper stops when [`ExpirySweeper::stop`] is called or its handle
//! is dropped, which happens when the owning storage is dropped.

use crate::error::{StorageError, StorageResult};
use crate::storage::engine::Shared;
use std::hash::Hash;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::runtime::Builder;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

/// Name of the dedicated sweeper thread.
const SWEEPER_THREAD_NAME: &str = "gcmap-sweeper";

/// A handle to the running expiry sweeper.
///
/// When this handle is dropped, the sweeper task will be stopped.
#[derive(Debug)]
pub(crate) struct ExpirySweeper {
    /// Sender to signal shutdown
    shutdown_tx: watch::Sender<bool>,
}

impl ExpirySweeper {
    /// Starts sweeping `shared` every `gc_interval`.
    ///
    /// The loop runs on a dedicated thread with its own runtime, independent
    /// of any runtime the caller may be in.
    pub(crate) fn start<K, V>(shared: Arc<Shared<K, V>>, gc_interval: Duration) -> StorageResult<Self>
    where
        K: Eq + Hash + Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let runtime = Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(StorageError::SweeperRuntime)?;

        thread::Builder::new()
            .name(SWEEPER_THREAD_NAME.to_string())
            .spawn(move || runtime.block_on(sweeper_loop(shared, gc_interval, shutdown_rx)))
            .map_err(StorageError::SweeperThread)?;

        info!(interval = ?gc_interval, "Background expiry sweeper started");

        Ok(Self { shutdown_tx })
    }

    /// Stops the expiry sweeper.
    ///
    /// This is called automatically when the handle is dropped.
    pub(crate) fn stop(&self) {
        if !self.shutdown_tx.send_replace(true) {
            info!("Background expiry sweeper stopped");
        }
    }

    /// Returns true until the sweeper has been stopped or its task has ended.
    pub(crate) fn is_running(&self) -> bool {
        !*self.shutdown_tx.borrow() && !self.shutdown_tx.is_closed()
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The main sweeper loop.
async fn sweeper_loop<K, V>(
    shared: Arc<Shared<K, V>>,
    gc_interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    K: Eq + Hash,
{
    // First pass one full interval after start, then one per interval.
    let mut ticker = interval_at(Instant::now() + gc_interval, gc_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Expiry sweeper received shutdown signal");
                    return;
                }
            }
        }

        let purged = shared.purge_stale();

        if purged > 0 {
            debug!(
                purged = purged,
                remaining = shared.len(),
                "Stale entries purged"
            );
        } else {
            trace!("Sweep found no stale entries");
        }
    }
}
