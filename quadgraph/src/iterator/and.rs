//! Intersection of iterators.

use std::any::Any;
use std::collections::HashMap;

use super::{
    BoxIterator, Context, GraphIterator, IteratorType, Null, RefKind, check_cancelled, discard,
    take_err,
};
use crate::error::GraphError;
use crate::types::Ref;

/// Yields the results accepted by every sub-iterator.
///
/// The first sub-iterator drives `next`; each candidate is then checked with
/// `contains` against the rest. The result set does not depend on the order
/// of the sub-iterators, only the cost of producing it does.
///
/// `next_path` walks the sub-iterators like an odometer: it advances the
/// first one that still has an alternate binding and rebinds every earlier
/// one to its first binding for the current result. All combinations are
/// enumerated before the next `next` advances.
#[derive(Debug, Default)]
pub struct And {
    subs: Vec<BoxIterator>,
    result: Option<Ref>,
    err: Option<GraphError>,
}

impl And {
    #[must_use]
    pub fn new(subs: Vec<BoxIterator>) -> Self {
        Self {
            subs,
            result: None,
            err: None,
        }
    }

    /// Append a sub-iterator. The first one added drives `next`.
    pub fn add(&mut self, sub: BoxIterator) {
        self.subs.push(sub);
    }

    #[must_use]
    pub fn subs(&self) -> &[BoxIterator] {
        &self.subs
    }

    /// Check `value` against `subs[from..]`.
    fn check_from(&mut self, ctx: &Context, from: usize, value: Ref) -> bool {
        for sub in &mut self.subs[from..] {
            if !sub.contains(ctx, value) {
                take_err(sub.as_ref(), &mut self.err);
                return false;
            }
        }
        true
    }
}

impl GraphIterator for And {
    fn next(&mut self, ctx: &Context) -> bool {
        loop {
            if check_cancelled(ctx, &mut self.err) {
                return false;
            }
            let Some(primary) = self.subs.first_mut() else {
                return false;
            };
            if !primary.next(ctx) {
                take_err(primary.as_ref(), &mut self.err);
                return false;
            }
            let Some(candidate) = primary.result() else {
                continue;
            };
            if self.check_from(ctx, 1, candidate) {
                // Start the primary from its first binding as well, so
                // `next_path` sees the same odometer as after `contains`.
                if !self.subs[0].contains(ctx, candidate) {
                    take_err(self.subs[0].as_ref(), &mut self.err);
                    return false;
                }
                self.result = Some(candidate);
                return true;
            }
            if self.err.is_some() {
                return false;
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
        if self.subs.is_empty() || check_cancelled(ctx, &mut self.err) {
            return false;
        }
        if self.check_from(ctx, 0, value) {
            self.result = Some(value);
            return true;
        }
        false
    }

    fn next_path(&mut self, ctx: &Context) -> bool {
        if check_cancelled(ctx, &mut self.err) {
            return false;
        }
        let Some(current) = self.result else {
            return false;
        };
        for i in 0..self.subs.len() {
            if self.subs[i].next_path(ctx) {
                for sub in &mut self.subs[..i] {
                    if !sub.contains(ctx, current) {
                        take_err(sub.as_ref(), &mut self.err);
                        return false;
                    }
                }
                return true;
            }
            take_err(self.subs[i].as_ref(), &mut self.err);
            if self.err.is_some() {
                return false;
            }
        }
        false
    }

    fn size(&self) -> (i64, bool) {
        let min = self.subs.iter().map(|sub| sub.size()).min_by_key(|(n, _)| *n);
        match min {
            Some((n, exact)) if self.subs.len() == 1 => (n, exact),
            Some((n, _)) => (n, false),
            None => (0, true),
        }
    }

    fn reset(&mut self) {
        for sub in &mut self.subs {
            sub.reset();
        }
        self.result = None;
        self.err = None;
    }

    fn optimize(self: Box<Self>) -> (BoxIterator, bool) {
        let mut changed = false;
        let mut subs: Vec<BoxIterator> = Vec::with_capacity(self.subs.len());
        for sub in self.subs {
            let (sub, sub_changed) = sub.optimize();
            changed |= sub_changed;
            if sub.as_any().is::<Self>() {
                if let Ok(inner) = sub.into_any().downcast::<Self>() {
                    subs.extend(inner.subs);
                    changed = true;
                }
            } else {
                subs.push(sub);
            }
        }

        if subs.is_empty() || subs.iter().any(|s| s.iterator_type() == IteratorType::Null) {
            subs.into_iter().for_each(discard);
            return (Null::boxed(), true);
        }

        let kinds: Vec<Option<RefKind>> = subs.iter().map(|s| s.result_kind()).collect();
        if kinds.contains(&Some(RefKind::Node)) && kinds.contains(&Some(RefKind::Quad)) {
            subs.into_iter().for_each(discard);
            return (Null::boxed(), true);
        }

        // An `All` child only narrows the kind of the results, so it can go
        // once every other child pins that kind down.
        let is_all = |s: &BoxIterator| s.iterator_type() == IteratorType::All;
        let mut others = subs.iter().filter(|s| !is_all(*s)).peekable();
        let pinned = others.peek().is_some() && others.all(|s| s.result_kind().is_some());
        if pinned && subs.iter().any(is_all) {
            let (all, rest): (Vec<_>, Vec<_>) = subs.into_iter().partition(is_all);
            all.into_iter().for_each(discard);
            subs = rest;
            changed = true;
        }

        if subs.len() == 1 {
            if let Some(only) = subs.pop() {
                return (only, true);
            }
        }

        let smallest = subs
            .iter()
            .enumerate()
            .min_by_key(|(_, s)| s.size().0)
            .map_or(0, |(i, _)| i);
        if smallest != 0 {
            let primary = subs.remove(smallest);
            subs.insert(0, primary);
            changed = true;
        }

        (Box::new(Self::new(subs)), changed)
    }

    fn close(&mut self) -> Result<(), GraphError> {
        let mut first_err = None;
        for sub in &mut self.subs {
            if let Err(e) = sub.close() {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn iterator_type(&self) -> IteratorType {
        IteratorType::And
    }

    fn result_kind(&self) -> Option<RefKind> {
        self.subs.iter().find_map(|sub| sub.result_kind())
    }

    fn tag_results(&self, dst: &mut HashMap<String, Ref>) {
        for sub in &self.subs {
            sub.tag_results(dst);
        }
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
    use std::collections::HashSet;

    use super::*;
    use crate::iterator::{Fixed, HasA, LinksTo, Save};
    use crate::store::StoreRef;
    use crate::testing::{fixture_store, iterated_quads, iterated_refs, node};
    use crate::types::{Direction, NodeId, Quad};

    fn n(id: u64) -> Ref {
        Ref::Node(NodeId(id))
    }

    fn fixed(ids: &[u64]) -> BoxIterator {
        Box::new(Fixed::new(ids.iter().copied().map(n).collect()))
    }

    #[test]
    fn test_intersection() {
        let mut it = And::new(vec![fixed(&[1, 2, 3, 4]), fixed(&[4, 2, 9])]);
        let ctx = Context::background();
        let mut got = Vec::new();
        while it.next(&ctx) {
            got.push(it.result().unwrap());
        }
        assert_eq!(got, vec![n(2), n(4)]);
        assert!(it.err().is_none());
    }

    #[test]
    fn test_contains_requires_every_sub() {
        let ctx = Context::background();
        let mut it = And::new(vec![fixed(&[1, 2]), fixed(&[2, 3])]);
        assert!(it.contains(&ctx, n(2)));
        assert_eq!(it.result(), Some(n(2)));
        assert!(!it.contains(&ctx, n(1)));
        assert!(!it.contains(&ctx, n(3)));
    }

    #[test]
    fn test_subject_and_object_intersection() {
        let store = fixture_store();
        let subject_b = LinksTo::new(
            store.clone(),
            Box::new(Fixed::new(vec![node(&store, "B")])),
            Direction::Subject,
        );
        let object_f = LinksTo::new(
            store.clone(),
            Box::new(Fixed::new(vec![node(&store, "F")])),
            Direction::Object,
        );
        let mut it = And::new(vec![Box::new(subject_b), Box::new(object_f)]);
        assert_eq!(
            iterated_quads(&store, &mut it),
            vec![Quad::triple("B", "follows", "F")]
        );
    }

    #[test]
    fn test_next_path_enumerates_every_combination() {
        let ctx = Context::background();
        let store = fixture_store();
        // Both subs accept the "follows" predicate through multiple quads:
        // the product of their bindings must be enumerated.
        let follows = node(&store, "follows");
        let objects_of_c = crate::iterator::HasA::new(
            store.clone(),
            Box::new(LinksTo::new(
                store.clone(),
                Box::new(Save::new(Box::new(Fixed::new(vec![node(&store, "C")])), "s")),
                Direction::Subject,
            )),
            Direction::Predicate,
        );
        let objects_of_d = crate::iterator::HasA::new(
            store.clone(),
            Box::new(LinksTo::new(
                store.clone(),
                Box::new(Save::new(Box::new(Fixed::new(vec![node(&store, "D")])), "t")),
                Direction::Subject,
            )),
            Direction::Predicate,
        );
        let mut it = And::new(vec![
            Box::new(Fixed::new(vec![follows])),
            Box::new(objects_of_c),
            Box::new(objects_of_d),
        ]);
        assert!(it.next(&ctx));
        assert_eq!(it.result(), Some(follows));
        let mut paths = 1;
        while it.next_path(&ctx) {
            assert_eq!(it.result(), Some(follows));
            paths += 1;
        }
        // C follows two nodes and D follows two nodes.
        assert_eq!(paths, 4);
        assert!(!it.next(&ctx));
        assert!(it.err().is_none());
    }

    /// Objects of the quads whose subject is one of `subjects`, with the
    /// subject recorded under `tag`.
    fn objects_of(store: &StoreRef, subjects: &[Ref], tag: &str) -> BoxIterator {
        let tagged = Save::new(Box::new(Fixed::new(subjects.to_vec())), tag);
        Box::new(HasA::new(
            store.clone(),
            Box::new(LinksTo::new(store.clone(), Box::new(tagged), Direction::Subject)),
            Direction::Object,
        ))
    }

    #[test]
    fn test_next_path_covers_product_when_primary_has_paths() {
        let ctx = Context::background();
        let store = fixture_store();
        let subjects: Vec<Ref> = ["A", "C", "D"].iter().map(|n| node(&store, n)).collect();
        let b = node(&store, "B");
        let mut it = And::new(vec![
            objects_of(&store, &subjects, "p"),
            objects_of(&store, &subjects, "q"),
        ]);

        let mut rows_for_b = 0;
        while it.next(&ctx) {
            if it.result() != Some(b) {
                continue;
            }
            rows_for_b += 1;
            let mut pairs = HashSet::new();
            loop {
                assert_eq!(it.result(), Some(b));
                let mut tags = HashMap::new();
                it.tag_results(&mut tags);
                pairs.insert((tags["p"], tags["q"]));
                if !it.next_path(&ctx) {
                    break;
                }
            }
            // A, C and D all follow B: every pairing of the two bindings.
            let expected: HashSet<(Ref, Ref)> = subjects
                .iter()
                .flat_map(|p| subjects.iter().map(move |q| (*p, *q)))
                .collect();
            assert_eq!(pairs, expected);
        }
        assert_eq!(rows_for_b, 3);
        assert!(it.err().is_none());
    }

    #[test]
    fn test_optimize_flattens_and_reorders() {
        let inner: BoxIterator = Box::new(And::new(vec![fixed(&[1, 2, 3]), fixed(&[2, 3])]));
        let outer: BoxIterator = Box::new(And::new(vec![fixed(&[1, 2, 3, 4]), inner, fixed(&[3])]));
        let (it, changed) = outer.optimize();
        assert!(changed);
        let and = it.as_any().downcast_ref::<And>().unwrap();
        assert_eq!(and.subs().len(), 4);
        assert_eq!(and.subs()[0].size(), (1, true));

        let mut it = it;
        assert_eq!(iterated_refs(it.as_mut()), vec![n(3)]);
    }

    #[test]
    fn test_optimize_null_child() {
        let it: BoxIterator = Box::new(And::new(vec![fixed(&[1]), fixed(&[])]));
        let (it, changed) = it.optimize();
        assert!(changed);
        assert_eq!(it.iterator_type(), IteratorType::Null);
    }

    #[test]
    fn test_optimize_drops_all_and_unwraps_single() {
        let store = fixture_store();
        let it: BoxIterator = Box::new(And::new(vec![store.nodes_all_iterator(), fixed(&[1])]));
        let (it, changed) = it.optimize();
        assert!(changed);
        assert_eq!(it.iterator_type(), IteratorType::Fixed);
    }

    #[test]
    fn test_optimize_node_and_quad_scans_is_null() {
        let store = fixture_store();
        let it: BoxIterator = Box::new(And::new(vec![
            store.nodes_all_iterator(),
            store.quads_all_iterator(),
        ]));
        let (mut it, changed) = it.optimize();
        assert!(changed);
        assert_eq!(it.iterator_type(), IteratorType::Null);
        assert!(iterated_refs(it.as_mut()).is_empty());

        let b = node(&store, "B");
        let quads_of_b: BoxIterator = Box::new(LinksTo::new(
            store.clone(),
            Box::new(Fixed::new(vec![b])),
            Direction::Subject,
        ));
        let mut plain = And::new(vec![store.nodes_all_iterator(), quads_of_b]);
        assert!(iterated_refs(&mut plain).is_empty());
    }

    #[test]
    fn test_optimize_keeps_all_beside_unknown_kind() {
        let store = fixture_store();
        let b = node(&store, "B");
        let mut quads = store.quads_all_iterator();
        let ctx = Context::background();
        assert!(quads.next(&ctx));
        let some_quad = quads.result().unwrap();

        // A fixed set holding both kinds: only the node scan filters it.
        let mixed = Box::new(Fixed::new(vec![b, some_quad]));
        let it: BoxIterator = Box::new(And::new(vec![store.nodes_all_iterator(), mixed]));
        let (mut it, _) = it.optimize();
        assert_eq!(it.iterator_type(), IteratorType::And);
        assert_eq!(iterated_refs(it.as_mut()), vec![b]);
    }

    #[test]
    fn test_already_optimal_is_unchanged() {
        let it: BoxIterator = Box::new(And::new(vec![fixed(&[2]), fixed(&[1, 2])]));
        let (it, changed) = it.optimize();
        assert!(!changed);
        assert_eq!(it.iterator_type(), IteratorType::And);
    }
}
