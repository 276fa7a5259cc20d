//! Errors surfaced by stores, writers and iterators.

use crate::types::Quad;

/// Errors that can occur during graph operations.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Add of a quad that is already stored, with duplicates not tolerated.
    QuadExists(Quad),
    /// Removal of a quad that is not stored.
    QuadNotExist(Quad),
    /// The iteration context was cancelled.
    Cancelled,
    /// A store lock was poisoned by a panicking writer.
    LockPoisoned,
    /// Any other failure surfaced by a backend during iteration.
    Iteration(String),
}

impl GraphError {
    /// Check whether this is a duplicate-add failure.
    #[must_use]
    pub const fn is_quad_exists(&self) -> bool {
        matches!(self, Self::QuadExists(_))
    }

    /// Check whether this is a missing-quad failure.
    #[must_use]
    pub const fn is_quad_not_exist(&self) -> bool {
        matches!(self, Self::QuadNotExist(_))
    }

    /// Check whether this error came from cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuadExists(q) => write!(f, "quad exists: {q}"),
            Self::QuadNotExist(q) => write!(f, "quad does not exist: {q}"),
            Self::Cancelled => write!(f, "iteration cancelled"),
            Self::LockPoisoned => write!(f, "store lock poisoned"),
            Self::Iteration(message) => write!(f, "iteration failed: {message}"),
        }
    }
}

impl std::error::Error for GraphError {}
