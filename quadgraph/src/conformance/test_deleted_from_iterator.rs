//! Test that deletes are visible to iterators opened before them.

use crate::conformance::helpers::*;
use crate::iterator::Context;
use crate::types::{Direction, Quad};
use crate::writer::WriterOptions;

#[test]
fn test_deleted_from_all_quads() {
    for_each_fixture_store(|h| {
        if !h.caps.sees_deletes_in_open_iterators {
            return;
        }
        let removed = Quad::triple("E", "follows", "F");
        let mut it = h.store.quads_all_iterator();
        h.writer(WriterOptions::default())
            .remove_quad(removed.clone())
            .unwrap();
        assert_eq!(
            h.quads(it.as_mut()),
            h.expected_quads(&fixture_without(&[removed])),
            "[{}]",
            h.name
        );
    });
}

#[test]
fn test_deleted_mid_iteration() {
    for_each_fixture_store(|h| {
        if !h.caps.sees_deletes_in_open_iterators {
            return;
        }
        let ctx = Context::background();
        let mut it = h.store.quad_iterator(Direction::Object, h.node("B"));
        assert!(it.next(&ctx), "[{}]", h.name);
        let first = h.store.quad(it.result().unwrap()).unwrap();

        // Remove every other quad pointing at B.
        let others: Vec<Quad> = ["A", "C", "D"]
            .iter()
            .map(|s| Quad::triple(*s, "follows", "B"))
            .filter(|q| h.caps.normalize_quad(q) != first)
            .collect();
        for q in others {
            h.writer(WriterOptions::default()).remove_quad(q).unwrap();
        }
        assert!(!it.next(&ctx), "[{}]", h.name);
        assert!(it.err().is_none());
    });
}
