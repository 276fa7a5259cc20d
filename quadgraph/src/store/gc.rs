//! Background node garbage collection for `MemStore`.
//!
//! With deferred node GC a value whose reference count reaches zero stays in
//! the value table until a GC tick reclaims it. The task spawned here runs
//! those ticks.
//!
//! # Design
//!
//! The task holds a `Weak` reference to the store state:
//! - Every `MemStore` handle owns a strong reference and the shared notify
//! - A delta batch that leaves zero-count values behind signals the notify
//! - When the last handle is dropped, `Weak::upgrade()` fails and the task exits

use std::sync::{Arc, RwLock, Weak};

use tokio::sync::Notify;

use crate::store::memstore::MemState;

/// Default number of values reclaimed per tick.
pub const DEFAULT_GC_BATCH_SIZE: usize = 100;

/// Configuration for the node garbage collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcConfig {
    /// Maximum number of values to reclaim per tick.
    pub batch_size: usize,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_GC_BATCH_SIZE,
        }
    }
}

/// Spawn a background GC task over a store's state.
///
/// The task waits for signals on `notify` and reclaims values in batches.
///
/// # Invariants
/// - Reclaims at most `config.batch_size` values per tick
/// - Re-signals itself while reclaimable values remain
/// - Exits cleanly once the state is dropped
pub(crate) fn spawn_gc_task(
    state: Weak<RwLock<MemState>>,
    notify: Arc<Notify>,
    config: GcConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(batch_size = config.batch_size, "node gc task started");
        gc_loop(state, notify, config).await;
        tracing::info!("node gc task stopped");
    })
}

async fn gc_loop(state: Weak<RwLock<MemState>>, notify: Arc<Notify>, config: GcConfig) {
    loop {
        notify.notified().await;

        let Some(state) = state.upgrade() else {
            break;
        };

        let result = {
            let Ok(mut state) = state.write() else {
                tracing::warn!("node gc stopping: memstore lock poisoned");
                break;
            };
            state.gc_tick(config.batch_size)
        };
        tracing::debug!(
            reclaimed = result.nodes_reclaimed,
            remaining = result.nodes_remaining,
            "node gc tick"
        );

        if result.nodes_remaining > 0 && result.nodes_reclaimed > 0 {
            notify.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::{Delta, IgnoreOptions, MemStore, MemStoreOptions, NodeGc, QuadStore};
    use crate::types::{Quad, Value};

    fn deferred_store(batch_size: usize) -> MemStore {
        MemStore::new(MemStoreOptions {
            node_gc: NodeGc::Deferred,
            ..MemStoreOptions::default()
        })
        .with_gc_config(GcConfig { batch_size })
    }

    #[tokio::test]
    async fn test_gc_task_exits_when_store_dropped() {
        let store = deferred_store(10);
        let handle = store.start_gc().unwrap();
        let notify = store.gc_notify_handle();

        drop(store);
        notify.notify_one();

        let result = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(result.is_ok(), "GC task should exit when the store is dropped");
    }

    #[tokio::test]
    async fn test_gc_task_reclaims_in_batches() {
        let store = deferred_store(1);
        let handle = store.start_gc().unwrap();
        let q = Quad::triple("A", "follows", "B");
        store
            .apply_deltas(&[Delta::add(q.clone())], IgnoreOptions::default())
            .unwrap();
        store
            .apply_deltas(&[Delta::delete(q)], IgnoreOptions::default())
            .unwrap();

        let drained = tokio::time::timeout(Duration::from_secs(1), async {
            while store.pending_gc().unwrap() > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(drained.is_ok(), "GC task should drain pending values");
        assert_eq!(store.value_of(&Value::string("A")), None);
        assert_eq!(store.size(), 0);
        handle.abort();
    }

    #[test]
    fn test_start_gc_outside_runtime() {
        assert!(deferred_store(10).start_gc().is_none());
    }

    #[tokio::test]
    async fn test_start_gc_requires_deferred_mode() {
        assert!(MemStore::default().start_gc().is_none());
    }

    #[test]
    fn test_gc_config_default() {
        assert_eq!(GcConfig::default().batch_size, 100);
    }
}
