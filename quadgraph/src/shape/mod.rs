//! Declarative query plans.
//!
//! A `Shape` describes what to compute without holding any iteration state,
//! so rewrite rules can pattern-match on it freely. `optimize` rewrites a
//! shape into an equivalent cheaper one and `build_iterator` compiles it.
//!
//! # Invariants
//!
//! - `optimize` returns the input unchanged and `false` when no rule applies.
//! - When `optimize` returns `true`, the rewritten shape compiles to an
//!   iterator with the same result set as the original.

use serde::{Deserialize, Serialize};

use crate::iterator::Operator;
use crate::types::{Direction, Ref, Value};

mod build;
mod optimize;

pub use build::build_iterator;
pub use optimize::optimize;

/// A query plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// No results.
    Null,
    /// Every value in the store.
    AllNodes,
    /// Every quad in the store.
    AllQuads,
    /// Explicit refs.
    Fixed(Vec<Ref>),
    /// Values to resolve against the store. Unknown values are dropped.
    Lookup(Vec<Value>),
    /// Quads matching every filter. No filters means all quads.
    Quads(Vec<QuadFilter>),
    /// The values in one direction of the quads produced by `quads`.
    NodesFrom { dir: Direction, quads: Box<Shape> },
    /// Refs produced by every member.
    Intersect(Vec<Shape>),
    /// Values of `from` that compare to `value` under `op`.
    Compare {
        from: Box<Shape>,
        op: Operator,
        value: Value,
    },
    /// Records the current result of `from` under `tag`.
    Save { tag: String, from: Box<Shape> },
}

/// Restricts quads to those whose value in `dir` is produced by `values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadFilter {
    pub dir: Direction,
    pub values: Box<Shape>,
}

impl QuadFilter {
    #[must_use]
    pub fn new(dir: Direction, values: Shape) -> Self {
        Self {
            dir,
            values: Box::new(values),
        }
    }
}

impl Shape {
    /// Values in `dir` of the quads produced by `quads`.
    #[must_use]
    pub fn nodes_from(dir: Direction, quads: Self) -> Self {
        Self::NodesFrom {
            dir,
            quads: Box::new(quads),
        }
    }

    #[must_use]
    pub fn compare(from: Self, op: Operator, value: Value) -> Self {
        Self::Compare {
            from: Box::new(from),
            op,
            value,
        }
    }

    #[must_use]
    pub fn save(tag: impl Into<String>, from: Self) -> Self {
        Self::Save {
            tag: tag.into(),
            from: Box::new(from),
        }
    }

    /// Rewrite the shape bottom-up.
    ///
    /// Children are rewritten first, then `f` is applied to the rebuilt node.
    /// Returns whether any call to `f` reported a change.
    pub fn rewrite<F>(self, f: &mut F) -> (Self, bool)
    where
        F: FnMut(Self) -> (Self, bool),
    {
        let mut changed = false;
        let mut child = |shape: Self, changed: &mut bool| {
            let (shape, c) = shape.rewrite(f);
            *changed |= c;
            shape
        };
        let rebuilt = match self {
            Self::Quads(filters) => Self::Quads(
                filters
                    .into_iter()
                    .map(|QuadFilter { dir, values }| QuadFilter::new(dir, child(*values, &mut changed)))
                    .collect(),
            ),
            Self::NodesFrom { dir, quads } => Self::nodes_from(dir, child(*quads, &mut changed)),
            Self::Intersect(members) => Self::Intersect(
                members
                    .into_iter()
                    .map(|member| child(member, &mut changed))
                    .collect(),
            ),
            Self::Compare { from, op, value } => Self::compare(child(*from, &mut changed), op, value),
            Self::Save { tag, from } => Self::save(tag, child(*from, &mut changed)),
            leaf @ (Self::Null
            | Self::AllNodes
            | Self::AllQuads
            | Self::Fixed(_)
            | Self::Lookup(_)) => leaf,
        };
        let (shape, applied) = f(rebuilt);
        (shape, changed || applied)
    }
}
