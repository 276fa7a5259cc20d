//! Primitive scans over `MemState`.
//!
//! Each scan holds the shared state and takes a read lock per step, so it
//! sees mutations applied after the iterator was opened.

use std::ops::Bound;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use crate::error::GraphError;
use crate::iterator::{Scan, saturating_len};
use crate::store::memstore::state::MemState;
use crate::types::{Direction, NodeId, QuadId, Ref};

pub(crate) type SharedState = Arc<RwLock<MemState>>;

pub(crate) fn read(state: &RwLock<MemState>) -> Result<RwLockReadGuard<'_, MemState>, GraphError> {
    state.read().map_err(|_| {
        tracing::warn!("memstore lock poisoned");
        GraphError::LockPoisoned
    })
}

/// Every node in the value table, in id order.
#[derive(Debug)]
pub(crate) struct NodesScan(pub SharedState);

impl Scan for NodesScan {
    fn next_after(&self, after: Option<Ref>) -> Result<Option<Ref>, GraphError> {
        let state = read(&self.0)?;
        let lower = after
            .and_then(Ref::as_node)
            .map_or(Bound::Unbounded, Bound::Excluded);
        Ok(state
            .nodes
            .range((lower, Bound::Unbounded))
            .next()
            .map(|(id, _)| Ref::Node(*id)))
    }

    fn includes(&self, value: Ref) -> Result<bool, GraphError> {
        let Some(node) = value.as_node() else {
            return Ok(false);
        };
        Ok(read(&self.0)?.nodes.contains_key(&node))
    }

    fn count(&self) -> Result<i64, GraphError> {
        Ok(saturating_len(read(&self.0)?.nodes.len()))
    }
}

/// Every stored quad, in id order.
#[derive(Debug)]
pub(crate) struct QuadsScan(pub SharedState);

impl Scan for QuadsScan {
    fn next_after(&self, after: Option<Ref>) -> Result<Option<Ref>, GraphError> {
        let state = read(&self.0)?;
        let lower = after
            .and_then(Ref::as_quad)
            .map_or(Bound::Unbounded, Bound::Excluded);
        Ok(state
            .quads
            .range((lower, Bound::Unbounded))
            .next()
            .map(|(id, _)| Ref::Quad(*id)))
    }

    fn includes(&self, value: Ref) -> Result<bool, GraphError> {
        let Some(quad) = value.as_quad() else {
            return Ok(false);
        };
        Ok(read(&self.0)?.quads.contains_key(&quad))
    }

    fn count(&self) -> Result<i64, GraphError> {
        Ok(saturating_len(read(&self.0)?.quads.len()))
    }
}

/// Quads holding one node in one direction, in id order.
#[derive(Debug)]
pub(crate) struct IndexScan {
    pub state: SharedState,
    pub direction: Direction,
    pub node: NodeId,
}

impl Scan for IndexScan {
    fn next_after(&self, after: Option<Ref>) -> Result<Option<Ref>, GraphError> {
        let state = read(&self.state)?;
        let Some(set) = state.index[self.direction.index()].get(&self.node) else {
            return Ok(None);
        };
        let lower: Bound<QuadId> = after
            .and_then(Ref::as_quad)
            .map_or(Bound::Unbounded, Bound::Excluded);
        Ok(set
            .range((lower, Bound::Unbounded))
            .next()
            .map(|id| Ref::Quad(*id)))
    }

    fn includes(&self, value: Ref) -> Result<bool, GraphError> {
        let Some(quad) = value.as_quad() else {
            return Ok(false);
        };
        let state = read(&self.state)?;
        Ok(state.index[self.direction.index()]
            .get(&self.node)
            .is_some_and(|set| set.contains(&quad)))
    }

    fn count(&self) -> Result<i64, GraphError> {
        let state = read(&self.state)?;
        Ok(saturating_len(
            state.index[self.direction.index()]
                .get(&self.node)
                .map_or(0, std::collections::BTreeSet::len),
        ))
    }
}
