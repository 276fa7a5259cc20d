//! Test that cancelling the context stops iteration with an error.

use crate::conformance::helpers::*;
use crate::error::GraphError;
use crate::iterator::{And, Context, GraphIterator, HasA, LinksTo};
use crate::types::Direction;

#[test]
fn test_cancel_all_quads() {
    for_each_fixture_store(|h| {
        let (ctx, handle) = Context::with_cancel();
        let mut it = h.store.quads_all_iterator();
        assert!(it.next(&ctx), "[{}]", h.name);

        handle.cancel();
        assert!(!it.next(&ctx), "[{}]", h.name);
        assert_eq!(it.err(), Some(&GraphError::Cancelled));
    });
}

#[test]
fn test_cancel_propagates_through_tree() {
    for_each_fixture_store(|h| {
        let (ctx, handle) = Context::with_cancel();
        let mut it = And::new(vec![
            h.store.nodes_all_iterator(),
            Box::new(HasA::new(
                h.store.clone(),
                Box::new(LinksTo::new(
                    h.store.clone(),
                    h.store.nodes_all_iterator(),
                    Direction::Object,
                )),
                Direction::Subject,
            )),
        ]);
        assert!(it.next(&ctx), "[{}]", h.name);
        handle.cancel();
        assert!(!it.next(&ctx));
        assert!(it.err().is_some_and(GraphError::is_cancelled), "[{}]", h.name);

        let node = h.node("C");
        assert!(!it.contains(&ctx, node));
        assert!(!it.next_path(&ctx));
    });
}

#[test]
fn test_exhaustion_is_not_an_error() {
    for_each_fixture_store(|h| {
        let ctx = Context::background();
        let mut it = h.store.quad_iterator(Direction::Subject, h.node("G"));
        assert!(!it.next(&ctx), "[{}]", h.name);
        assert!(it.err().is_none());
    });
}
