//! Cursor-driven iterator over a store-native ordered collection.
//!
//! Backends implement `Scan` for each primitive collection they expose
//! (all values, all quads, quads by direction). `ScanIterator` drives the
//! cursor: it remembers the last reference it returned and asks the scan for
//! the next one after it, so changes made to the store while the iterator is
//! open are observed on the following step.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use super::{BoxIterator, Context, GraphIterator, IteratorType, RefKind, check_cancelled};
use crate::error::GraphError;
use crate::types::Ref;

/// A store-native ordered collection of references.
pub trait Scan: fmt::Debug + Send + Sync {
    /// The first reference strictly after `after`, or the first reference
    /// when `after` is `None`.
    fn next_after(&self, after: Option<Ref>) -> Result<Option<Ref>, GraphError>;

    /// Check whether the collection holds `value`.
    fn includes(&self, value: Ref) -> Result<bool, GraphError>;

    /// Number of references currently in the collection.
    fn count(&self) -> Result<i64, GraphError>;
}

/// Iterator over a `Scan`.
///
/// Built either as an `All` iterator (every value or every quad) or as an
/// `Index` iterator (quads sharing one value in one direction). `All` is
/// already as simple as an iterator gets, so `optimize` never changes it.
#[derive(Debug)]
pub struct ScanIterator {
    scan: Box<dyn Scan>,
    kind: IteratorType,
    refs: RefKind,
    cursor: Option<Ref>,
    result: Option<Ref>,
    err: Option<GraphError>,
    done: bool,
    closed: bool,
}

impl ScanIterator {
    /// An `All` iterator over a scan that yields `refs`.
    #[must_use]
    pub fn all(scan: Box<dyn Scan>, refs: RefKind) -> Self {
        Self::with_kind(scan, IteratorType::All, refs)
    }

    /// An `Index` iterator over a scan of quads.
    #[must_use]
    pub fn index(scan: Box<dyn Scan>) -> Self {
        Self::with_kind(scan, IteratorType::Index, RefKind::Quad)
    }

    const fn with_kind(scan: Box<dyn Scan>, kind: IteratorType, refs: RefKind) -> Self {
        Self {
            scan,
            kind,
            refs,
            cursor: None,
            result: None,
            err: None,
            done: false,
            closed: false,
        }
    }
}

impl GraphIterator for ScanIterator {
    fn next(&mut self, ctx: &Context) -> bool {
        if self.done || self.closed || check_cancelled(ctx, &mut self.err) {
            return false;
        }
        match self.scan.next_after(self.cursor) {
            Ok(Some(value)) => {
                self.cursor = Some(value);
                self.result = Some(value);
                true
            }
            Ok(None) => {
                self.done = true;
                false
            }
            Err(e) => {
                self.err = Some(e);
                false
            }
        }
    }

    fn result(&self) -> Option<Ref> {
        self.result
    }

    fn err(&self) -> Option<&GraphError> {
        self.err.as_ref()
    }

    fn contains(&mut self, ctx: &Context, value: Ref) -> bool {
        if self.closed || check_cancelled(ctx, &mut self.err) {
            return false;
        }
        match self.scan.includes(value) {
            Ok(true) => {
                self.result = Some(value);
                true
            }
            Ok(false) => false,
            Err(e) => {
                self.err = Some(e);
                false
            }
        }
    }

    fn next_path(&mut self, _ctx: &Context) -> bool {
        false
    }

    fn size(&self) -> (i64, bool) {
        match self.scan.count() {
            Ok(n) => (n, true),
            Err(_) => (0, false),
        }
    }

    fn reset(&mut self) {
        self.cursor = None;
        self.result = None;
        self.err = None;
        self.done = false;
    }

    fn optimize(self: Box<Self>) -> (BoxIterator, bool) {
        (self, false)
    }

    fn close(&mut self) -> Result<(), GraphError> {
        self.closed = true;
        Ok(())
    }

    fn iterator_type(&self) -> IteratorType {
        self.kind
    }

    fn result_kind(&self) -> Option<RefKind> {
        Some(self.refs)
    }

    fn tag_results(&self, _dst: &mut HashMap<String, Ref>) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
