//! Test quad index iterators and their intersections.

use crate::conformance::helpers::*;
use crate::iterator::{And, BoxIterator};
use crate::store::StoreRef;
use crate::types::{Direction, Quad};

fn index(h: &Harness, direction: Direction, name: &str) -> BoxIterator {
    h.store.quad_iterator(direction, h.node(name))
}

fn status(name: &str) -> Quad {
    Quad::make(name, "status", "cool", Some("status_graph"))
}

#[test]
fn test_single_direction() {
    for_each_fixture_store(|h| {
        let cases = [
            (
                Direction::Subject,
                "C",
                vec![Quad::triple("C", "follows", "B"), Quad::triple("C", "follows", "D")],
            ),
            (
                Direction::Object,
                "F",
                vec![Quad::triple("B", "follows", "F"), Quad::triple("E", "follows", "F")],
            ),
            (Direction::Predicate, "status", vec![status("B"), status("D"), status("G")]),
            (Direction::Label, "status_graph", vec![status("B"), status("D"), status("G")]),
        ];
        for (direction, name, expected) in cases {
            let mut it = index(&h, direction, name);
            assert_eq!(
                h.quads(it.as_mut()),
                h.expected_quads(&expected),
                "[{}] {direction} {name}",
                h.name
            );
        }
    });
}

#[test]
fn test_and_in_both_orders() {
    for_each_fixture_store(|h| {
        let expected = h.expected_quads(&[Quad::triple("C", "follows", "B")]);
        let mut forward = And::new(vec![
            index(&h, Direction::Subject, "C"),
            index(&h, Direction::Object, "B"),
        ]);
        let mut backward = And::new(vec![
            index(&h, Direction::Object, "B"),
            index(&h, Direction::Subject, "C"),
        ]);
        assert_eq!(h.quads(&mut forward), expected, "[{}]", h.name);
        assert_eq!(h.quads(&mut backward), expected, "[{}]", h.name);

        let mut subject_and_object = And::new(vec![
            index(&h, Direction::Subject, "B"),
            index(&h, Direction::Object, "F"),
        ]);
        assert_eq!(
            h.quads(&mut subject_and_object),
            h.expected_quads(&[Quad::triple("B", "follows", "F")]),
            "[{}]",
            h.name
        );
    });
}

#[test]
fn test_quad_iterator_on_quad_ref_is_empty() {
    for_each_fixture_store(|h| {
        let store: &StoreRef = &h.store;
        let quad = store.quad_ref(&Quad::triple("C", "follows", "B")).unwrap();
        let mut it = store.quad_iterator(Direction::Subject, quad);
        assert!(iterated_refs(it.as_mut()).is_empty(), "[{}]", h.name);
    });
}
