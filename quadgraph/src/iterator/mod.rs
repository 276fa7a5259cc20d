//! Lazy, pull-based iterators over store references.
//!
//! Every iterator is a single-threaded cursor driven by explicit calls:
//! - `next` advances the primary position
//! - `contains` checks membership without moving the primary position
//! - `next_path` enumerates alternate bindings for the current result
//!
//! A `false` from any of those calls means either exhaustion or failure.
//! Callers check `err()` to tell them apart; cancellation through the
//! `Context` is recorded there as `GraphError::Cancelled`.
//!
//! # Example
//!
//! ```ignore
//! let ctx = Context::background();
//! let mut it = And::new(vec![
//!     store.quad_iterator(Direction::Subject, b),
//!     store.quad_iterator(Direction::Object, f),
//! ]);
//! while it.next(&ctx) {
//!     let quad = store.quad(it.result()?);
//! }
//! if let Some(err) = it.err() { ... }
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::GraphError;
use crate::store::QuadStore;
use crate::types::Ref;

mod and;
mod comparison;
mod fixed;
mod hasa;
mod linksto;
mod null;
mod save;
mod scan;

pub use and::And;
pub use comparison::{Comparison, Operator};
pub use fixed::Fixed;
pub use hasa::HasA;
pub use linksto::{LINKS_TO_FANOUT, LinksTo};
pub use null::Null;
pub use save::Save;
pub use scan::{Scan, ScanIterator};

/// An owned, dynamically dispatched iterator.
pub type BoxIterator = Box<dyn GraphIterator>;

/// The concrete kind of an iterator, used by optimizers to pattern-match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IteratorType {
    Null,
    Fixed,
    All,
    Index,
    LinksTo,
    HasA,
    And,
    Comparison,
    Save,
}

impl fmt::Display for IteratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Fixed => "fixed",
            Self::All => "all",
            Self::Index => "index",
            Self::LinksTo => "linksto",
            Self::HasA => "hasa",
            Self::And => "and",
            Self::Comparison => "comparison",
            Self::Save => "save",
        };
        f.write_str(name)
    }
}

/// Which variant of `Ref` an iterator produces.
///
/// Node refs and quad refs never compare equal, so an intersection that mixes
/// the two kinds is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Node,
    Quad,
}

impl RefKind {
    #[must_use]
    pub const fn of(value: Ref) -> Self {
        if value.is_node() { Self::Node } else { Self::Quad }
    }

    /// The kind shared by every ref, or `None` when `refs` is empty or mixed.
    pub fn common<I: IntoIterator<Item = Ref>>(refs: I) -> Option<Self> {
        let mut refs = refs.into_iter();
        let first = Self::of(refs.next()?);
        refs.all(|r| Self::of(r) == first).then_some(first)
    }
}

/// Cancellation signal threaded through iterator calls.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Option<Arc<AtomicBool>>,
}

impl Context {
    /// A context that is never cancelled.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// A context paired with the handle that cancels it.
    #[must_use]
    pub fn with_cancel() -> (Self, CancelHandle) {
        let flag = Arc::new(AtomicBool::new(false));
        let handle = CancelHandle(Arc::clone(&flag));
        (
            Self {
                cancelled: Some(flag),
            },
            handle,
        )
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Acquire))
    }
}

/// Cancels the `Context` it was created with.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// The capability set shared by every iterator.
pub trait GraphIterator: fmt::Debug + Send {
    /// Advance to the next result. Returns false at the end, on cancellation,
    /// or on failure.
    fn next(&mut self, ctx: &Context) -> bool;

    /// The current result, if any.
    fn result(&self) -> Option<Ref>;

    /// The terminal error, if iteration stopped for a reason other than
    /// exhaustion.
    fn err(&self) -> Option<&GraphError>;

    /// Check whether `value` is in the result set. On success the value
    /// becomes the current result and `next_path` enumerates its bindings.
    fn contains(&mut self, ctx: &Context, value: Ref) -> bool;

    /// Move to the next alternate binding that justifies the current result.
    fn next_path(&mut self, ctx: &Context) -> bool;

    /// Estimated result count and whether the estimate is exact.
    fn size(&self) -> (i64, bool);

    /// Return to the initial state, before the first `next`.
    fn reset(&mut self);

    /// Rewrite into an equivalent, cheaper iterator. Returns `self` and
    /// `false` when no rule applies.
    fn optimize(self: Box<Self>) -> (BoxIterator, bool);

    /// Release held resources. Idempotent.
    fn close(&mut self) -> Result<(), GraphError>;

    fn iterator_type(&self) -> IteratorType;

    /// The kind shared by every result, when the iterator knows it.
    fn result_kind(&self) -> Option<RefKind> {
        None
    }

    /// Record the current result of every tagged iterator in the tree.
    fn tag_results(&self, dst: &mut HashMap<String, Ref>);

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Run the generic rewrite rules, then the store's own hook.
pub fn optimize_tree(store: &dyn QuadStore, it: BoxIterator) -> (BoxIterator, bool) {
    let (it, generic) = it.optimize();
    let (it, backend) = store.optimize_iterator(it);
    (it, generic || backend)
}

/// A collection length as an `i64` size, saturating at `i64::MAX`.
pub(crate) fn saturating_len(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Record cancellation as the terminal error. Returns true when cancelled.
pub(crate) fn check_cancelled(ctx: &Context, err: &mut Option<GraphError>) -> bool {
    if ctx.is_cancelled() {
        *err = Some(GraphError::Cancelled);
        return true;
    }
    false
}

/// Copy a sub-iterator's error, if it has one.
pub(crate) fn take_err(sub: &dyn GraphIterator, err: &mut Option<GraphError>) {
    if let Some(e) = sub.err() {
        *err = Some(e.clone());
    }
}

/// Close a sub-iterator that is being discarded.
pub(crate) fn discard(mut it: BoxIterator) {
    if let Err(e) = it.close() {
        tracing::warn!("failed to close discarded {} iterator: {e}", it.iterator_type());
    }
}
