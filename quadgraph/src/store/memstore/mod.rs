//! In-memory reference backend.
//!
//! `MemStore` is a cheap-to-clone handle around shared index state. Every
//! declared capability is selectable through `MemStoreOptions`, which is how
//! the conformance suite exercises each branch of the store contract.

use std::sync::{Arc, RwLock, RwLockWriteGuard};

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::error::GraphError;
use crate::iterator::{
    BoxIterator, Fixed, IteratorType, LinksTo, Null, RefKind, ScanIterator, discard,
    saturating_len,
};
use crate::shape::Shape;
use crate::store::gc::{GcConfig, spawn_gc_task};
use crate::store::{
    Capabilities, Delta, IgnoreOptions, NodeGc, QuadStore, SizeAccounting, ValueSizer,
};
use crate::types::{Direction, Quad, Ref, TimePrecision, Value};

mod scan;
mod state;

use scan::{IndexScan, NodesScan, QuadsScan, SharedState, read};
pub use state::GcTickResult;
pub(crate) use state::MemState;

/// Behaviour switches for a `MemStore`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemStoreOptions {
    pub node_gc: NodeGc,
    pub size_accounting: SizeAccounting,
    pub time_precision: TimePrecision,
    pub time_round: bool,
    pub untyped: bool,
    pub optimizes_comparison: bool,
}

/// An in-memory quad store.
#[derive(Debug, Clone)]
pub struct MemStore {
    state: SharedState,
    options: MemStoreOptions,
    gc_notify: Arc<Notify>,
    gc_config: GcConfig,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new(MemStoreOptions::default())
    }
}

impl MemStore {
    #[must_use]
    pub fn new(options: MemStoreOptions) -> Self {
        Self {
            state: Arc::new(RwLock::new(MemState::default())),
            options,
            gc_notify: Arc::new(Notify::new()),
            gc_config: GcConfig::default(),
        }
    }

    /// Set the GC configuration used by `start_gc`.
    #[must_use]
    pub const fn with_gc_config(mut self, config: GcConfig) -> Self {
        self.gc_config = config;
        self
    }

    #[must_use]
    pub const fn options(&self) -> MemStoreOptions {
        self.options
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemState>, GraphError> {
        self.state.write().map_err(|_| {
            tracing::warn!("memstore lock poisoned");
            GraphError::LockPoisoned
        })
    }

    /// Reclaim at most `batch_size` zero-count values now.
    ///
    /// Only deferred GC leaves work for a tick.
    pub fn gc_tick(&self, batch_size: usize) -> Result<GcTickResult, GraphError> {
        let result = self.write()?.gc_tick(batch_size);
        tracing::debug!(
            reclaimed = result.nodes_reclaimed,
            remaining = result.nodes_remaining,
            "memstore gc tick"
        );
        Ok(result)
    }

    /// Number of zero-count values waiting for a GC tick.
    pub fn pending_gc(&self) -> Result<usize, GraphError> {
        Ok(read(&self.state)?.pending_gc())
    }

    /// Spawn the background GC task for deferred node GC.
    ///
    /// Returns `None` when node GC is not deferred or when called outside a
    /// tokio runtime. The task exits once every handle to this store is
    /// dropped and the task is woken.
    #[must_use]
    pub fn start_gc(&self) -> Option<JoinHandle<()>> {
        if self.options.node_gc != NodeGc::Deferred || Handle::try_current().is_err() {
            return None;
        }
        let handle = spawn_gc_task(
            Arc::downgrade(&self.state),
            Arc::clone(&self.gc_notify),
            self.gc_config,
        );
        // Values released before the task started.
        self.gc_notify.notify_one();
        Some(handle)
    }

    /// Wake the GC task.
    pub fn notify_gc(&self) {
        self.gc_notify.notify_one();
    }

    #[cfg(test)]
    pub(crate) fn gc_notify_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.gc_notify)
    }

    /// Resolve every node whose value compares to `pivot` under `op`.
    fn compare_nodes(&self, op: crate::iterator::Operator, pivot: &Value) -> Option<Vec<Ref>> {
        let state = read(&self.state).ok()?;
        Some(
            state
                .nodes
                .iter()
                .filter(|(_, entry)| {
                    entry
                        .value
                        .compare(pivot)
                        .is_some_and(|ord| op.matches(ord))
                })
                .map(|(id, _)| Ref::Node(*id))
                .collect(),
        )
    }
}

impl QuadStore for MemStore {
    fn value_of(&self, value: &Value) -> Option<Ref> {
        let value = self.capabilities().normalize(value);
        let state = read(&self.state).ok()?;
        state.values.get(&value).map(|id| Ref::Node(*id))
    }

    fn name_of(&self, node: Ref) -> Option<Value> {
        let id = node.as_node()?;
        let state = read(&self.state).ok()?;
        state.nodes.get(&id).map(|entry| entry.value.clone())
    }

    fn quad(&self, quad: Ref) -> Option<Quad> {
        let id = quad.as_quad()?;
        let state = read(&self.state).ok()?;
        state.quads.get(&id).map(|stored| stored.quad.clone())
    }

    fn quad_ref(&self, quad: &Quad) -> Option<Ref> {
        let quad = self.capabilities().normalize_quad(quad);
        let state = read(&self.state).ok()?;
        state.quad_ids.get(&quad).map(|id| Ref::Quad(*id))
    }

    fn quad_direction(&self, quad: Ref, direction: Direction) -> Option<Ref> {
        let id = quad.as_quad()?;
        let state = read(&self.state).ok()?;
        state
            .quads
            .get(&id)
            .and_then(|stored| stored.dirs[direction.index()])
            .map(Ref::Node)
    }

    fn quad_iterator(&self, direction: Direction, node: Ref) -> BoxIterator {
        let Some(node) = node.as_node() else {
            return Null::boxed();
        };
        Box::new(ScanIterator::index(Box::new(IndexScan {
            state: Arc::clone(&self.state),
            direction,
            node,
        })))
    }

    fn nodes_all_iterator(&self) -> BoxIterator {
        Box::new(ScanIterator::all(
            Box::new(NodesScan(Arc::clone(&self.state))),
            RefKind::Node,
        ))
    }

    fn quads_all_iterator(&self) -> BoxIterator {
        Box::new(ScanIterator::all(
            Box::new(QuadsScan(Arc::clone(&self.state))),
            RefKind::Quad,
        ))
    }

    fn size(&self) -> i64 {
        let Ok(state) = read(&self.state) else {
            return 0;
        };
        let n = match self.options.size_accounting {
            SizeAccounting::QuadsAndValues => state.quads.len() + state.nodes.len(),
            SizeAccounting::QuadsOnly => state.quads.len(),
        };
        saturating_len(n)
    }

    fn apply_deltas(&self, deltas: &[Delta], opts: IgnoreOptions) -> Result<(), GraphError> {
        let caps = self.capabilities();
        let normalized = deltas
            .iter()
            .map(|delta| Delta {
                quad: caps.normalize_quad(&delta.quad),
                action: delta.action,
            })
            .collect();
        let (added, removed, pending) = {
            let mut state = self.write()?;
            let (added, removed) = state.apply(normalized, opts, self.options.node_gc)?;
            (added, removed, state.pending_gc())
        };
        tracing::debug!(added, removed, pending_gc = pending, "applied delta batch");
        if pending > 0 {
            self.gc_notify.notify_one();
        }
        Ok(())
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            node_gc: self.options.node_gc,
            size_accounting: self.options.size_accounting,
            time_precision: self.options.time_precision,
            time_round: self.options.time_round,
            untyped: self.options.untyped,
            optimizes_comparison: self.options.optimizes_comparison,
            sees_deletes_in_open_iterators: true,
        }
    }

    /// Rewrites `LinksTo(Fixed[node], dir)` into a direct index scan.
    fn optimize_iterator(&self, it: BoxIterator) -> (BoxIterator, bool) {
        if it.iterator_type() != IteratorType::LinksTo {
            return (it, false);
        }
        let target = it.as_any().downcast_ref::<LinksTo>().and_then(|links| {
            let fixed = links.primary().as_any().downcast_ref::<Fixed>()?;
            match fixed.values() {
                [node @ Ref::Node(_)] => Some((links.direction(), *node)),
                _ => None,
            }
        });
        let Some((direction, node)) = target else {
            return (it, false);
        };
        discard(it);
        (self.quad_iterator(direction, node), true)
    }

    /// Answers `Compare(AllNodes, op, value)` from the value table.
    fn optimize_shape(&self, shape: Shape) -> (Shape, bool) {
        if !self.options.optimizes_comparison {
            return (shape, false);
        }
        shape.rewrite(&mut |shape| match shape {
            Shape::Compare { from, op, value } if *from == Shape::AllNodes => {
                match self.compare_nodes(op, &value) {
                    Some(refs) => (Shape::Fixed(refs), true),
                    None => (Shape::Compare { from, op, value }, false),
                }
            }
            other => (other, false),
        })
    }

    fn value_sizer(&self) -> Option<&dyn ValueSizer> {
        Some(self)
    }
}

impl ValueSizer for MemStore {
    fn size_of(&self, node: Ref) -> Option<i64> {
        let id = node.as_node()?;
        let state = read(&self.state).ok()?;
        state.nodes.get(&id).map(|entry| entry.refs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator::{Context, Operator};
    use crate::testing::{fixture_store, node};

    #[test]
    fn test_value_roundtrip() {
        let store = fixture_store();
        let b = store.value_of(&Value::string("B")).unwrap();
        let name = store.name_of(b).unwrap();
        assert_eq!(name, Value::string("B"));
        assert_eq!(store.value_of(&name), Some(b));
        assert_eq!(store.value_of(&Value::string("nope")), None);
    }

    #[test]
    fn test_untyped_roundtrip() {
        let store = MemStore::new(MemStoreOptions {
            untyped: true,
            ..MemStoreOptions::default()
        });
        store
            .apply_deltas(
                &[Delta::add(Quad::triple("a", "n", 5_i64))],
                IgnoreOptions::default(),
            )
            .unwrap();
        let five = store.value_of(&Value::Int(5)).unwrap();
        let name = store.name_of(five).unwrap();
        assert_eq!(name, Value::raw(Value::Int(5).to_string()));
        assert_eq!(store.value_of(&name), Some(five));
    }

    #[test]
    fn test_open_iterator_sees_delete() {
        let store = MemStore::default();
        let ab = Quad::triple("A", "follows", "B");
        let cb = Quad::triple("C", "follows", "B");
        store
            .apply_deltas(&[Delta::add(ab.clone()), Delta::add(cb.clone())], IgnoreOptions::default())
            .unwrap();
        let ctx = Context::background();
        let b = store.value_of(&Value::string("B")).unwrap();
        let mut it = store.quad_iterator(Direction::Object, b);
        store
            .apply_deltas(&[Delta::delete(ab)], IgnoreOptions::default())
            .unwrap();
        assert!(it.next(&ctx));
        assert_eq!(store.quad(it.result().unwrap()), Some(cb));
        assert!(!it.next(&ctx));
    }

    #[test]
    fn test_optimize_iterator_rewrites_single_node_links_to() {
        let store = fixture_store();
        let c = node(&store, "C");
        let it: BoxIterator = Box::new(LinksTo::new(
            store.clone(),
            Box::new(Fixed::new(vec![c])),
            Direction::Subject,
        ));
        let (it, changed) = store.optimize_iterator(it);
        assert!(changed);
        assert_eq!(it.iterator_type(), IteratorType::Index);

        let all = store.nodes_all_iterator();
        let (all, changed) = store.optimize_iterator(all);
        assert!(!changed);
        assert_eq!(all.iterator_type(), IteratorType::All);
    }

    #[test]
    fn test_optimize_shape_only_when_enabled() {
        let shape = Shape::Compare {
            from: Box::new(Shape::AllNodes),
            op: Operator::Lt,
            value: Value::string("B"),
        };
        let store = MemStore::default();
        let (same, changed) = store.optimize_shape(shape.clone());
        assert!(!changed);
        assert_eq!(same, shape);

        let store = MemStore::new(MemStoreOptions {
            optimizes_comparison: true,
            ..MemStoreOptions::default()
        });
        store
            .apply_deltas(
                &[Delta::add(Quad::triple("A", "follows", "B"))],
                IgnoreOptions::default(),
            )
            .unwrap();
        let (rewritten, changed) = store.optimize_shape(shape);
        assert!(changed);
        let a = store.value_of(&Value::string("A")).unwrap();
        assert_eq!(rewritten, Shape::Fixed(vec![a]));
    }

    #[test]
    fn test_value_sizer() {
        let store = fixture_store();
        let sizer = store.value_sizer().unwrap();
        assert_eq!(sizer.size_of(node(&store, "B")), Some(5));
    }

    #[test]
    fn test_size_accounting() {
        let store = MemStore::new(MemStoreOptions {
            size_accounting: SizeAccounting::QuadsOnly,
            ..MemStoreOptions::default()
        });
        store
            .apply_deltas(
                &[Delta::add(Quad::triple("A", "follows", "B"))],
                IgnoreOptions::default(),
            )
            .unwrap();
        assert_eq!(store.size(), 1);
    }
}
