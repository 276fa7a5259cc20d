//! Test the primitive all-nodes and all-quads iterators.

use crate::conformance::helpers::*;
use crate::iterator::{Context, IteratorType};
use crate::testing::make_quad_set;

#[test]
fn test_nodes_all_iterator() {
    for_each_fixture_store(|h| {
        let it = h.store.nodes_all_iterator();
        let (size, _) = it.size();
        assert!(size > 0 && size < 23, "[{}] size {size}", h.name);
        assert_eq!(it.iterator_type(), IteratorType::All);

        let (mut it, changed) = it.optimize();
        assert!(!changed, "[{}]", h.name);
        assert_eq!(it.iterator_type(), IteratorType::All);

        let expected = h.expected_values(fixture_values());
        assert_eq!(h.values(it.as_mut()), expected, "[{}]", h.name);
        it.reset();
        assert_eq!(h.values(it.as_mut()), expected, "[{}] after reset", h.name);

        let ctx = Context::background();
        for name in ["C", "cool", "status_graph"] {
            let node = h.node(name);
            assert!(it.contains(&ctx, node), "[{}] contains {name}", h.name);
            assert_eq!(it.result(), Some(node));
        }
        it.close().unwrap();
    });
}

#[test]
fn test_quads_all_iterator() {
    for_each_fixture_store(|h| {
        let ctx = Context::background();
        let mut it = h.store.quads_all_iterator();
        assert!(it.next(&ctx), "[{}]", h.name);
        let first = h.store.quad(it.result().unwrap()).unwrap();
        assert!(h.expected_quads(&make_quad_set()).contains(&first));

        it.reset();
        assert_eq!(
            h.quads(it.as_mut()),
            h.expected_quads(&make_quad_set()),
            "[{}]",
            h.name
        );
    });
}

#[test]
fn test_closed_iterator_is_exhausted() {
    for_each_fixture_store(|h| {
        let ctx = Context::background();
        let mut it = h.store.quads_all_iterator();
        it.close().unwrap();
        it.close().unwrap();
        assert!(!it.next(&ctx), "[{}]", h.name);
        assert!(it.err().is_none());
    });
}
