//! Value-to-quad bridge.

use std::any::Any;
use std::collections::HashMap;

use super::{
    BoxIterator, Context, GraphIterator, IteratorType, Null, RefKind, check_cancelled, discard,
    take_err,
};
use crate::error::GraphError;
use crate::store::StoreRef;
use crate::types::{Direction, Ref};

/// Assumed number of quads per value when estimating `LinksTo` size.
pub const LINKS_TO_FANOUT: i64 = 20;

/// Yields every quad whose value in `direction` is produced by the
/// sub-iterator.
///
/// `next` pulls a value from the sub-iterator and walks the store's index for
/// that value before pulling the next one. `contains` goes the other way: it
/// reads the quad's value in `direction` and asks the sub-iterator about it.
#[derive(Debug)]
pub struct LinksTo {
    store: StoreRef,
    primary: BoxIterator,
    direction: Direction,
    next_it: Option<BoxIterator>,
    result: Option<Ref>,
    err: Option<GraphError>,
}

impl LinksTo {
    #[must_use]
    pub fn new(store: StoreRef, primary: BoxIterator, direction: Direction) -> Self {
        Self {
            store,
            primary,
            direction,
            next_it: None,
            result: None,
            err: None,
        }
    }

    /// The value-level sub-iterator.
    #[must_use]
    pub fn primary(&self) -> &dyn GraphIterator {
        self.primary.as_ref()
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    fn drop_next_it(&mut self) {
        if let Some(it) = self.next_it.take() {
            discard(it);
        }
    }
}

impl GraphIterator for LinksTo {
    fn next(&mut self, ctx: &Context) -> bool {
        loop {
            if check_cancelled(ctx, &mut self.err) {
                return false;
            }
            if let Some(it) = self.next_it.as_mut() {
                if it.next(ctx) {
                    self.result = it.result();
                    return true;
                }
                take_err(it.as_ref(), &mut self.err);
                if self.err.is_some() {
                    return false;
                }
                self.drop_next_it();
            }
            if !self.primary.next(ctx) {
                take_err(self.primary.as_ref(), &mut self.err);
                return false;
            }
            if let Some(node) = self.primary.result() {
                self.next_it = Some(self.store.quad_iterator(self.direction, node));
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
        let Some(node) = self.store.quad_direction(value, self.direction) else {
            return false;
        };
        if self.primary.contains(ctx, node) {
            self.result = Some(value);
            return true;
        }
        take_err(self.primary.as_ref(), &mut self.err);
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
        false
    }

    fn size(&self) -> (i64, bool) {
        let (size, _) = self.primary.size();
        (size.saturating_mul(LINKS_TO_FANOUT), false)
    }

    fn reset(&mut self) {
        self.drop_next_it();
        self.primary.reset();
        self.result = None;
        self.err = None;
    }

    fn optimize(self: Box<Self>) -> (BoxIterator, bool) {
        let Self {
            store,
            primary,
            direction,
            next_it,
            ..
        } = *self;
        if let Some(it) = next_it {
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
        self.drop_next_it();
        self.primary.close()
    }

    fn iterator_type(&self) -> IteratorType {
        IteratorType::LinksTo
    }

    fn result_kind(&self) -> Option<RefKind> {
        Some(RefKind::Quad)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator::Fixed;
    use crate::testing::{fixture_store, iterated_quads, node};
    use crate::types::Quad;

    #[test]
    fn test_links_to_subject() {
        let store = fixture_store();
        let c = node(&store, "C");
        let mut it = LinksTo::new(
            store.clone(),
            Box::new(Fixed::new(vec![c])),
            Direction::Subject,
        );
        assert_eq!(
            iterated_quads(&store, &mut it),
            vec![
                Quad::triple("C", "follows", "B"),
                Quad::triple("C", "follows", "D"),
            ]
        );
    }

    #[test]
    fn test_contains_checks_direction_value() {
        let store = fixture_store();
        let ctx = Context::background();
        let f = node(&store, "F");
        let mut it = LinksTo::new(
            store.clone(),
            Box::new(Fixed::new(vec![f])),
            Direction::Object,
        );
        let bf = store
            .quad_ref(&Quad::triple("B", "follows", "F"))
            .unwrap();
        let ab = store
            .quad_ref(&Quad::triple("A", "follows", "B"))
            .unwrap();
        assert!(it.contains(&ctx, bf));
        assert_eq!(it.result(), Some(bf));
        assert!(!it.contains(&ctx, ab));
        assert!(it.err().is_none());
    }

    #[test]
    fn test_size_is_inexact_fanout() {
        let store = fixture_store();
        let it = LinksTo::new(
            store.clone(),
            Box::new(Fixed::new(vec![node(&store, "B"), node(&store, "C")])),
            Direction::Object,
        );
        assert_eq!(it.size(), (2 * LINKS_TO_FANOUT, false));
    }

    #[test]
    fn test_optimize_over_empty_is_null() {
        let store = fixture_store();
        let it: BoxIterator = Box::new(LinksTo::new(
            store,
            Box::new(Fixed::new(Vec::new())),
            Direction::Subject,
        ));
        let (it, changed) = it.optimize();
        assert!(changed);
        assert_eq!(it.iterator_type(), IteratorType::Null);
    }
}
