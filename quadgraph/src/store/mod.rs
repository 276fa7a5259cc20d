//! The quad store contract.
//!
//! A `QuadStore` holds a deduplicated value table and an edge index over it.
//! It resolves values to opaque `Ref`s and back, hands out primitive
//! iterators, and applies batches of quad mutations. Behaviour that differs
//! between backends is declared through `Capabilities` rather than assumed.
//!
//! # Invariants
//!
//! - `value_of(v)` is deterministic: equal values resolve to the same ref.
//! - `name_of(value_of(v)?)` equals `v` after the backend's normalization.
//! - `value_of(&name_of(r)?)` returns `r`.
//! - `apply_deltas` either applies the whole batch or fails before
//!   mutating anything.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::iterator::BoxIterator;
use crate::shape::Shape;
use crate::types::{Direction, Quad, Ref, TimePrecision, Value, normalize_time};

pub mod gc;
mod memstore;

pub use memstore::{GcTickResult, MemStore, MemStoreOptions};

/// A shared handle to a store. Iterators keep one to resolve their results.
pub type StoreRef = Arc<dyn QuadStore>;

/// Kind of a single mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Add,
    Delete,
}

/// A single quad mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub quad: Quad,
    pub action: Action,
}

impl Delta {
    #[must_use]
    pub const fn add(quad: Quad) -> Self {
        Self {
            quad,
            action: Action::Add,
        }
    }

    #[must_use]
    pub const fn delete(quad: Quad) -> Self {
        Self {
            quad,
            action: Action::Delete,
        }
    }
}

/// Which per-delta failures a batch tolerates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IgnoreOptions {
    /// Skip adds of quads that already exist instead of failing.
    pub ignore_dup: bool,
    /// Skip deletes of quads that do not exist instead of failing.
    pub ignore_missing: bool,
}

/// When a value whose reference count dropped to zero is reclaimed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeGc {
    /// In the same mutation that dropped the count to zero.
    #[default]
    Immediate,
    /// On a later GC tick. Until then the value stays resolvable and
    /// enumerable.
    Deferred,
    /// Never.
    Disabled,
}

/// What `QuadStore::size` counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeAccounting {
    /// Live quads plus the values still held in the value table.
    #[default]
    QuadsAndValues,
    /// Live quads only.
    QuadsOnly,
}

/// Behaviour a backend declares instead of guaranteeing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub node_gc: NodeGc,
    pub size_accounting: SizeAccounting,
    pub time_precision: TimePrecision,
    /// Timestamps are rounded to `time_precision` rather than truncated.
    pub time_round: bool,
    /// Values are stored as `Value::Raw` of their canonical form.
    pub untyped: bool,
    /// The backend's shape hook answers comparisons over all nodes itself.
    pub optimizes_comparison: bool,
    /// Iterators opened before a delete stop returning the deleted quad.
    pub sees_deletes_in_open_iterators: bool,
}

impl Capabilities {
    /// The value the backend stores for `value`.
    #[must_use]
    pub fn normalize(&self, value: &Value) -> Value {
        let value = match value {
            Value::Time(t) => Value::Time(normalize_time(*t, self.time_precision, self.time_round)),
            other => other.clone(),
        };
        if self.untyped && !matches!(value, Value::Raw(_)) {
            return Value::Raw(value.to_string());
        }
        value
    }

    /// The quad the backend stores for `quad`.
    #[must_use]
    pub fn normalize_quad(&self, quad: &Quad) -> Quad {
        quad.map_values(|v| self.normalize(v))
    }
}

/// Optional capability: how many quads reference a value.
pub trait ValueSizer {
    /// The reference count of a node, or `None` for an unknown ref.
    fn size_of(&self, node: Ref) -> Option<i64>;
}

/// A backend holding quads over deduplicated values.
pub trait QuadStore: fmt::Debug + Send + Sync {
    /// Resolve a value to its ref. `None` if the value is not stored.
    fn value_of(&self, value: &Value) -> Option<Ref>;

    /// Materialize a node ref back into its value.
    fn name_of(&self, node: Ref) -> Option<Value>;

    /// Resolve a quad ref, as produced by a quad-level iterator.
    fn quad(&self, quad: Ref) -> Option<Quad>;

    /// Resolve a quad to its ref. `None` if the quad is not stored.
    fn quad_ref(&self, quad: &Quad) -> Option<Ref>;

    /// The node ref in one direction of a quad ref.
    fn quad_direction(&self, quad: Ref, direction: Direction) -> Option<Ref>;

    /// All quads whose value in `direction` is `node`, in store order.
    fn quad_iterator(&self, direction: Direction, node: Ref) -> BoxIterator;

    /// Every value in the value table.
    fn nodes_all_iterator(&self) -> BoxIterator;

    /// Every stored quad.
    fn quads_all_iterator(&self) -> BoxIterator;

    /// See `SizeAccounting`.
    fn size(&self) -> i64;

    /// Apply a batch of mutations atomically.
    ///
    /// # Errors
    ///
    /// `QuadExists` or `QuadNotExist` for the first delta that is not
    /// tolerated by `opts`; nothing is applied in that case.
    fn apply_deltas(&self, deltas: &[Delta], opts: IgnoreOptions) -> Result<(), GraphError>;

    fn capabilities(&self) -> Capabilities;

    /// Backend-specific rewrite of an iterator tree. Returns the iterator
    /// unchanged and `false` when no rule applies.
    fn optimize_iterator(&self, it: BoxIterator) -> (BoxIterator, bool) {
        (it, false)
    }

    /// Backend-specific rewrite of a shape, run after the generic rules.
    fn optimize_shape(&self, shape: Shape) -> (Shape, bool) {
        (shape, false)
    }

    fn value_sizer(&self) -> Option<&dyn ValueSizer> {
        None
    }

    /// Release backend resources. Idempotent.
    fn close(&self) -> Result<(), GraphError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    #[test]
    fn test_normalize_untyped() {
        let caps = Capabilities {
            untyped: true,
            ..Capabilities::default()
        };
        assert_eq!(caps.normalize(&Value::Int(5)), Value::raw(Value::Int(5).to_string()));
        assert_eq!(caps.normalize(&Value::raw("x")), Value::raw("x"));
    }

    #[test]
    fn test_normalize_time_precision() {
        let caps = Capabilities {
            time_precision: TimePrecision::Millis,
            ..Capabilities::default()
        };
        let t: DateTime<Utc> = DateTime::from_timestamp(10, 1_234_567).unwrap();
        assert_eq!(
            caps.normalize(&Value::Time(t)),
            Value::Time(DateTime::from_timestamp(10, 1_000_000).unwrap())
        );
        assert_eq!(caps.normalize(&Value::string("a")), Value::string("a"));
    }

    #[test]
    fn test_delta_constructors() {
        let q = Quad::triple("A", "follows", "B");
        assert_eq!(Delta::add(q.clone()).action, Action::Add);
        assert_eq!(Delta::delete(q).action, Action::Delete);
    }
}
