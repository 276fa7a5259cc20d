//! Index state behind a `MemStore`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::GraphError;
use crate::store::{Action, Delta, IgnoreOptions, NodeGc};
use crate::types::{Direction, NodeId, Quad, QuadId, Value};

/// A value in the value table with its reference count.
#[derive(Debug)]
pub(crate) struct NodeEntry {
    pub value: Value,
    pub refs: i64,
}

/// A stored quad with the node id in each direction.
#[derive(Debug)]
pub(crate) struct StoredQuad {
    pub quad: Quad,
    pub dirs: [Option<NodeId>; 4],
}

impl StoredQuad {
    /// Node ids of the quad, each listed once.
    fn distinct_nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.dirs.iter().flatten().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Outcome of one GC tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcTickResult {
    /// Values removed from the value table during this tick.
    pub nodes_reclaimed: usize,
    /// Zero-count values still waiting for a tick.
    pub nodes_remaining: usize,
}

/// Value table, quad table and per-direction indexes.
///
/// Node and quad ids share one counter and are never reused.
#[derive(Debug, Default)]
pub(crate) struct MemState {
    next_id: u64,
    pub values: HashMap<Value, NodeId>,
    pub nodes: BTreeMap<NodeId, NodeEntry>,
    pub quads: BTreeMap<QuadId, StoredQuad>,
    pub quad_ids: HashMap<Quad, QuadId>,
    pub index: [HashMap<NodeId, BTreeSet<QuadId>>; 4],
    pending_gc: BTreeSet<NodeId>,
}

impl MemState {
    const fn alloc(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Check a batch of normalized deltas against the current state, then
    /// apply the ones that are not skipped. Nothing is applied on error.
    pub fn apply(
        &mut self,
        deltas: Vec<Delta>,
        opts: IgnoreOptions,
        gc: NodeGc,
    ) -> Result<(usize, usize), GraphError> {
        // Presence as seen by later deltas in the same batch.
        let mut overlay: HashMap<&Quad, bool> = HashMap::new();
        let mut keep = vec![false; deltas.len()];
        for (i, delta) in deltas.iter().enumerate() {
            let present = overlay
                .get(&delta.quad)
                .copied()
                .unwrap_or_else(|| self.quad_ids.contains_key(&delta.quad));
            match delta.action {
                Action::Add if present => {
                    if !opts.ignore_dup {
                        return Err(GraphError::QuadExists(delta.quad.clone()));
                    }
                }
                Action::Delete if !present => {
                    if !opts.ignore_missing {
                        return Err(GraphError::QuadNotExist(delta.quad.clone()));
                    }
                }
                Action::Add => {
                    overlay.insert(&delta.quad, true);
                    keep[i] = true;
                }
                Action::Delete => {
                    overlay.insert(&delta.quad, false);
                    keep[i] = true;
                }
            }
        }

        let mut added = 0;
        let mut removed = 0;
        for (delta, keep) in deltas.into_iter().zip(keep) {
            if !keep {
                continue;
            }
            match delta.action {
                Action::Add => {
                    self.insert_quad(delta.quad);
                    added += 1;
                }
                Action::Delete => {
                    self.remove_quad(&delta.quad, gc);
                    removed += 1;
                }
            }
        }
        Ok((added, removed))
    }

    fn intern(&mut self, value: &Value) -> NodeId {
        if let Some(id) = self.values.get(value) {
            return *id;
        }
        let id = NodeId(self.alloc());
        self.values.insert(value.clone(), id);
        self.nodes.insert(
            id,
            NodeEntry {
                value: value.clone(),
                refs: 0,
            },
        );
        id
    }

    fn insert_quad(&mut self, quad: Quad) {
        let mut dirs = [None; 4];
        for (direction, value) in quad.values() {
            dirs[direction.index()] = Some(self.intern(value));
        }
        let id = QuadId(self.alloc());
        let stored = StoredQuad { quad, dirs };
        for node in stored.distinct_nodes() {
            if let Some(entry) = self.nodes.get_mut(&node) {
                entry.refs += 1;
            }
            self.pending_gc.remove(&node);
        }
        for direction in Direction::ALL {
            if let Some(node) = stored.dirs[direction.index()] {
                self.index[direction.index()]
                    .entry(node)
                    .or_default()
                    .insert(id);
            }
        }
        self.quad_ids.insert(stored.quad.clone(), id);
        self.quads.insert(id, stored);
    }

    fn remove_quad(&mut self, quad: &Quad, gc: NodeGc) {
        let Some(id) = self.quad_ids.remove(quad) else {
            return;
        };
        let Some(stored) = self.quads.remove(&id) else {
            return;
        };
        for direction in Direction::ALL {
            let Some(node) = stored.dirs[direction.index()] else {
                continue;
            };
            let index = &mut self.index[direction.index()];
            if let Some(set) = index.get_mut(&node) {
                set.remove(&id);
                if set.is_empty() {
                    index.remove(&node);
                }
            }
        }
        for node in stored.distinct_nodes() {
            let Some(entry) = self.nodes.get_mut(&node) else {
                continue;
            };
            entry.refs -= 1;
            if entry.refs > 0 {
                continue;
            }
            match gc {
                NodeGc::Immediate => {
                    self.reclaim(node);
                }
                NodeGc::Deferred => {
                    self.pending_gc.insert(node);
                }
                NodeGc::Disabled => {}
            }
        }
    }

    /// Drop a node from the value table if nothing references it.
    fn reclaim(&mut self, node: NodeId) -> bool {
        if self.nodes.get(&node).is_none_or(|entry| entry.refs > 0) {
            return false;
        }
        if let Some(entry) = self.nodes.remove(&node) {
            self.values.remove(&entry.value);
        }
        true
    }

    /// Reclaim at most `batch_size` zero-count values.
    pub fn gc_tick(&mut self, batch_size: usize) -> GcTickResult {
        let batch: Vec<NodeId> = self.pending_gc.iter().take(batch_size).copied().collect();
        let mut nodes_reclaimed = 0;
        for node in batch {
            self.pending_gc.remove(&node);
            if self.reclaim(node) {
                nodes_reclaimed += 1;
            }
        }
        GcTickResult {
            nodes_reclaimed,
            nodes_remaining: self.pending_gc.len(),
        }
    }

    pub fn pending_gc(&self) -> usize {
        self.pending_gc.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(state: &mut MemState, quads: &[Quad], gc: NodeGc) -> Result<(usize, usize), GraphError> {
        let deltas = quads.iter().cloned().map(Delta::add).collect();
        state.apply(deltas, IgnoreOptions::default(), gc)
    }

    #[test]
    fn test_refcount_counts_distinct_values_once_per_quad() {
        let mut state = MemState::default();
        add(&mut state, &[Quad::triple("A", "A", "B")], NodeGc::Immediate).unwrap();
        let a = state.values[&Value::string("A")];
        assert_eq!(state.nodes[&a].refs, 1);
    }

    #[test]
    fn test_strict_batch_is_all_or_nothing() {
        let mut state = MemState::default();
        add(&mut state, &[Quad::triple("A", "follows", "B")], NodeGc::Immediate).unwrap();
        let err = add(
            &mut state,
            &[
                Quad::triple("C", "follows", "D"),
                Quad::triple("A", "follows", "B"),
            ],
            NodeGc::Immediate,
        )
        .unwrap_err();
        assert!(err.is_quad_exists());
        assert_eq!(state.quads.len(), 1);
        assert!(!state.values.contains_key(&Value::string("C")));
    }

    #[test]
    fn test_duplicate_within_batch() {
        let mut state = MemState::default();
        let q = Quad::triple("A", "follows", "B");
        let err = add(&mut state, &[q.clone(), q.clone()], NodeGc::Immediate).unwrap_err();
        assert_eq!(err, GraphError::QuadExists(q.clone()));

        let deltas = vec![Delta::add(q.clone()), Delta::delete(q.clone()), Delta::add(q)];
        assert_eq!(
            state.apply(deltas, IgnoreOptions::default(), NodeGc::Immediate),
            Ok((2, 1))
        );
        assert_eq!(state.quads.len(), 1);
    }

    #[test]
    fn test_immediate_gc_reclaims_on_delete() {
        let mut state = MemState::default();
        let q = Quad::triple("A", "follows", "B");
        add(&mut state, &[q.clone()], NodeGc::Immediate).unwrap();
        state
            .apply(vec![Delta::delete(q)], IgnoreOptions::default(), NodeGc::Immediate)
            .unwrap();
        assert!(state.nodes.is_empty());
        assert!(state.values.is_empty());
        assert!(state.index.iter().all(HashMap::is_empty));
    }

    #[test]
    fn test_deferred_gc_waits_for_tick() {
        let mut state = MemState::default();
        let q = Quad::triple("A", "follows", "B");
        add(&mut state, &[q.clone()], NodeGc::Deferred).unwrap();
        state
            .apply(vec![Delta::delete(q)], IgnoreOptions::default(), NodeGc::Deferred)
            .unwrap();
        assert_eq!(state.nodes.len(), 3);
        assert_eq!(state.pending_gc(), 3);

        let tick = state.gc_tick(2);
        assert_eq!(tick.nodes_reclaimed, 2);
        assert_eq!(tick.nodes_remaining, 1);
        let tick = state.gc_tick(2);
        assert_eq!(tick.nodes_reclaimed, 1);
        assert_eq!(tick.nodes_remaining, 0);
        assert!(state.nodes.is_empty());
    }

    #[test]
    fn test_readd_before_tick_keeps_node() {
        let mut state = MemState::default();
        let ab = Quad::triple("A", "follows", "B");
        add(&mut state, &[ab.clone()], NodeGc::Deferred).unwrap();
        state
            .apply(vec![Delta::delete(ab)], IgnoreOptions::default(), NodeGc::Deferred)
            .unwrap();
        add(&mut state, &[Quad::triple("A", "likes", "C")], NodeGc::Deferred).unwrap();
        state.gc_tick(100);
        assert!(state.values.contains_key(&Value::string("A")));
        assert!(!state.values.contains_key(&Value::string("B")));
    }

    #[test]
    fn test_ids_are_never_reused() {
        let mut state = MemState::default();
        let q = Quad::triple("A", "follows", "B");
        add(&mut state, &[q.clone()], NodeGc::Immediate).unwrap();
        let first = state.quad_ids[&q];
        state
            .apply(vec![Delta::delete(q.clone())], IgnoreOptions::default(), NodeGc::Immediate)
            .unwrap();
        add(&mut state, &[q.clone()], NodeGc::Immediate).unwrap();
        assert!(state.quad_ids[&q] > first);
    }
}
