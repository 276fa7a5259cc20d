//! Quad-to-value projection.

use std::any::Any;
use std::collections::HashMap;

use super::{
    BoxIterator, Context, GraphIterator, IteratorType, Null, RefKind, check_cancelled, discard,
    take_err,
};
use crate::error::GraphError;
use crate::store::StoreRef;
use crate::types::{Direction, Ref};

/// Projects each quad produced by the sub-iterator onto its value in
/// `direction`.
///
/// The same value may be produced more than once when several quads share
/// it. After `contains(v)` the iterator holds a cursor over the store's index
/// for `v`; `next_path` first asks the sub-iterator for another binding and
/// then moves that cursor to the next quad the sub-iterator accepts, so the
/// caller can recover every quad that justifies `v`.
#[derive(Debug)]
pub struct HasA {
    store: StoreRef,
    primary: BoxIterator,
    direction: Direction,
    result_it: Option<BoxIterator>,
    result: Option<Ref>,
    err: Option<GraphError>,
}

impl HasA {
    #[must_use]
    pub fn new(store: StoreRef, primary: BoxIterator, direction: Direction) -> Self {
        Self {
            store,
            primary,
            direction,
            result_it: None,
            result: None,
            err: None,
        }
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    fn drop_result_it(&mut self) {
        if let Some(it) = self.result_it.take() {
            discard(it);
        }
    }

    /// Advance the index cursor to the next quad the sub-iterator accepts.
    fn next_contains(&mut self, ctx: &Context) -> bool {
        let Some(result_it) = self.result_it.as_mut() else {
            return false;
        };
        while result_it.next(ctx) {
            let Some(link) = result_it.result() else {
                continue;
            };
            if self.primary.contains(ctx, link) {
                return true;
            }
            take_err(self.primary.as_ref(), &mut self.err);
            if self.err.is_some() {
                return false;
            }
        }
        take_err(result_it.as_ref(), &mut self.err);
        false
    }
}

impl GraphIterator for HasA {
    fn next(&mut self, ctx: &Context) -> bool {
        self.drop_result_it();
        loop {
            if check_cancelled(ctx, &mut self.err) {
                return false;
            }
            if !self.primary.next(ctx) {
                take_err(self.primary.as_ref(), &mut self.err);
                return false;
            }
            let projected = self
                .primary
                .result()
                .and_then(|quad| self.store.quad_direction(quad, self.direction));
            // Quads without a label project to nothing.
            if projected.is_some() {
                self.result = projected;
                return true;
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
        if check_cancelled(ctx, &mut self.err) {
            return false;
        }
        self.drop_result_it();
        self.result_it = Some(self.store.quad_iterator(self.direction, value));
        if self.next_contains(ctx) {
            self.result = Some(value);
            return true;
        }
        false
    }

    fn next_path(&mut self, ctx: &Context) -> bool {
        if check_cancelled(ctx, &mut self.err) {
            return false;
        }
        if self.primary.next_path(ctx) {
            return true;
        }
        take_err(self.primary.as_ref(), &mut self.err);
        if self.err.is_some() {
            return false;
        }
        self.next_contains(ctx)
    }

    fn size(&self) -> (i64, bool) {
        let (size, _) = self.primary.size();
        (size, false)
    }

    fn reset(&mut self) {
        self.drop_result_it();
        self.primary.reset();
        self.result = None;
        self.err = None;
    }

    fn optimize(self: Box<Self>) -> (BoxIterator, bool) {
        let Self {
            store,
            primary,
            direction,
            result_it,
            ..
        } = *self;
        if let Some(it) = result_it {
            discard(it);
        }
        let (primary, changed) = primary.optimize();
        if primary.iterator_type() == IteratorType::Null {
            discard(primary);
            return (Null::boxed(), true);
        }
        (Box::new(Self::new(store, primary, direction)), changed)
    }

    fn close(&mut self) -> Result<(), GraphError> {
        self.drop_result_it();
        self.primary.close()
    }

    fn iterator_type(&self) -> IteratorType {
        IteratorType::HasA
    }

    fn result_kind(&self) -> Option<RefKind> {
        Some(RefKind::Node)
    }

    fn tag_results(&self, dst: &mut HashMap<String, Ref>) {
        self.primary.tag_results(dst);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
