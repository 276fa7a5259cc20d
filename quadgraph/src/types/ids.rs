//! Reference types handed out by a quad store.
//!
//! This module provides newtype wrappers for node and quad identifiers and
//! the `Ref` token that iterators produce. The numeric values are chosen by
//! the backend and carry no meaning outside the store that issued them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a deduplicated value in a store's value table.
///
/// # Invariants
///
/// - Stable for as long as the value stays in the store.
/// - Never reused by the issuing store once reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Get the raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Identifier of a stored quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct QuadId(pub u64);

impl QuadId {
    /// Get the raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for QuadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u64> for QuadId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A result token produced by an iterator.
///
/// Value-level iterators yield `Ref::Node`, quad-level iterators yield
/// `Ref::Quad`. A store resolves node refs with `name_of` and quad refs with
/// `quad`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ref {
    Node(NodeId),
    Quad(QuadId),
}

impl Ref {
    /// The node id, if this is a node ref.
    #[must_use]
    pub const fn as_node(self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(id),
            Self::Quad(_) => None,
        }
    }

    /// The quad id, if this is a quad ref.
    #[must_use]
    pub const fn as_quad(self) -> Option<QuadId> {
        match self {
            Self::Quad(id) => Some(id),
            Self::Node(_) => None,
        }
    }

    #[must_use]
    pub const fn is_node(self) -> bool {
        matches!(self, Self::Node(_))
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => write!(f, "{id}"),
            Self::Quad(id) => write!(f, "{id}"),
        }
    }
}

impl From<NodeId> for Ref {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<QuadId> for Ref {
    fn from(id: QuadId) -> Self {
        Self::Quad(id)
    }
}
