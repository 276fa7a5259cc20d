//! Iterator over an explicit, finite set of references.

use std::any::Any;
use std::collections::{HashMap, HashSet};

use super::{
    BoxIterator, Context, GraphIterator, IteratorType, Null, RefKind, check_cancelled,
    saturating_len,
};
use crate::error::GraphError;
use crate::types::Ref;

/// Enumerates its references in insertion order. Each result has exactly one
/// binding, so `next_path` never succeeds.
#[derive(Debug, Default)]
pub struct Fixed {
    values: Vec<Ref>,
    members: HashSet<Ref>,
    index: usize,
    result: Option<Ref>,
    err: Option<GraphError>,
}

impl Fixed {
    #[must_use]
    pub fn new(values: Vec<Ref>) -> Self {
        let members = values.iter().copied().collect();
        Self {
            values,
            members,
            ..Self::default()
        }
    }

    /// Append a reference.
    pub fn add(&mut self, value: Ref) {
        self.members.insert(value);
        self.values.push(value);
    }

    #[must_use]
    pub fn values(&self) -> &[Ref] {
        &self.values
    }
}

impl GraphIterator for Fixed {
    fn next(&mut self, ctx: &Context) -> bool {
        if check_cancelled(ctx, &mut self.err) {
            return false;
        }
        let Some(value) = self.values.get(self.index) else {
            return false;
        };
        self.result = Some(*value);
        self.index += 1;
        true
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
        if self.members.contains(&value) {
            self.result = Some(value);
            return true;
        }
        false
    }

    fn next_path(&mut self, _ctx: &Context) -> bool {
        false
    }

    fn size(&self) -> (i64, bool) {
        (saturating_len(self.values.len()), true)
    }

    fn reset(&mut self) {
        self.index = 0;
        self.result = None;
        self.err = None;
    }

    fn optimize(self: Box<Self>) -> (BoxIterator, bool) {
        if self.values.is_empty() {
            return (Null::boxed(), true);
        }
        (self, false)
    }

    fn close(&mut self) -> Result<(), GraphError> {
        Ok(())
    }

    fn iterator_type(&self) -> IteratorType {
        IteratorType::Fixed
    }

    fn result_kind(&self) -> Option<RefKind> {
        RefKind::common(self.values.iter().copied())
    }

    fn tag_results(&self, _dst: &mut HashMap<String, Ref>) {}

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
    use crate::types::NodeId;

    fn node(n: u64) -> Ref {
        Ref::Node(NodeId(n))
    }

    #[test]
    fn test_enumerates_in_insertion_order() {
        let ctx = Context::background();
        let mut it = Fixed::new(vec![node(3), node(1), node(2)]);
        let mut got = Vec::new();
        while it.next(&ctx) {
            got.push(it.result().unwrap());
            assert!(!it.next_path(&ctx));
        }
        assert_eq!(got, vec![node(3), node(1), node(2)]);
        assert!(it.err().is_none());
    }

    #[test]
    fn test_contains_does_not_move_position() {
        let ctx = Context::background();
        let mut it = Fixed::new(vec![node(1), node(2)]);
        assert!(it.next(&ctx));
        assert!(it.contains(&ctx, node(2)));
        assert_eq!(it.result(), Some(node(2)));
        assert!(!it.contains(&ctx, node(9)));
        assert!(it.next(&ctx));
        assert_eq!(it.result(), Some(node(2)));
        assert!(!it.next(&ctx));
    }

    #[test]
    fn test_reset_restarts() {
        let ctx = Context::background();
        let mut it = Fixed::new(vec![node(1)]);
        assert!(it.next(&ctx));
        assert!(!it.next(&ctx));
        it.reset();
        assert!(it.next(&ctx));
    }

    #[test]
    fn test_cancelled_next_sets_err() {
        let (ctx, handle) = Context::with_cancel();
        let mut it = Fixed::new(vec![node(1)]);
        handle.cancel();
        assert!(!it.next(&ctx));
        assert_eq!(it.err(), Some(&GraphError::Cancelled));
    }

    #[test]
    fn test_empty_optimizes_to_null() {
        let (it, changed) = Box::new(Fixed::new(Vec::new())).optimize();
        assert!(changed);
        assert_eq!(it.iterator_type(), IteratorType::Null);

        let (it, changed) = Box::new(Fixed::new(vec![node(1)])).optimize();
        assert!(!changed);
        assert_eq!(it.iterator_type(), IteratorType::Fixed);
    }

    #[test]
    fn test_size_and_result_kind() {
        let it = Fixed::new(vec![node(1), node(2), node(3)]);
        assert_eq!(it.size(), (3, true));
        assert_eq!(it.result_kind(), Some(RefKind::Node));

        let mixed = Fixed::new(vec![node(1), Ref::Quad(crate::types::QuadId(1))]);
        assert_eq!(mixed.result_kind(), None);
        assert_eq!(Fixed::new(Vec::new()).size(), (0, true));
    }
}
