//! Test that shape optimization preserves results and reaches a fixed point.

use crate::conformance::helpers::*;
use crate::iterator::Operator;
use crate::shape::{QuadFilter, Shape, build_iterator, optimize};
use crate::types::{Direction, Ref, Value};

fn shapes() -> Vec<Shape> {
    let lookup = |names: &[&str]| Shape::Lookup(strings(names));
    vec![
        // Who does C follow?
        Shape::nodes_from(
            Direction::Object,
            Shape::Quads(vec![
                QuadFilter::new(Direction::Subject, lookup(&["C"])),
                QuadFilter::new(Direction::Predicate, lookup(&["follows"])),
            ]),
        ),
        // Cool values that someone follows.
        Shape::Intersect(vec![
            Shape::AllNodes,
            Shape::nodes_from(
                Direction::Subject,
                Shape::Quads(vec![QuadFilter::new(Direction::Object, lookup(&["cool"]))]),
            ),
            Shape::Intersect(vec![Shape::nodes_from(
                Direction::Object,
                Shape::Quads(vec![QuadFilter::new(
                    Direction::Predicate,
                    lookup(&["follows"]),
                )]),
            )]),
        ]),
        Shape::Intersect(vec![lookup(&["B", "C", "D"]), lookup(&["D", "B", "Z"])]),
        Shape::save("x", lookup(&["nobody"])),
        Shape::Quads(Vec::new()),
        Shape::Intersect(vec![
            Shape::compare(Shape::AllNodes, Operator::Gt, Value::string("C")),
            Shape::Save {
                tag: "who".to_string(),
                from: Box::new(lookup(&["D", "E", "A"])),
            },
        ]),
        // Values and quads never intersect.
        Shape::Intersect(vec![Shape::AllNodes, Shape::AllQuads]),
        Shape::Intersect(vec![
            Shape::AllNodes,
            Shape::Quads(vec![QuadFilter::new(Direction::Subject, lookup(&["B"]))]),
        ]),
        Shape::Intersect(vec![
            Shape::AllQuads,
            Shape::Quads(vec![QuadFilter::new(Direction::Predicate, lookup(&["status"]))]),
        ]),
    ]
}

fn distinct(mut refs: Vec<Ref>) -> Vec<Ref> {
    refs.sort_unstable();
    refs.dedup();
    refs
}

#[test]
fn test_optimize_preserves_results() {
    for_each_fixture_store(|h| {
        for shape in shapes() {
            let (optimized, _) = optimize(shape.clone(), h.store.as_ref());
            let mut original = build_iterator(&h.store, &shape);
            let mut rewritten = build_iterator(&h.store, &optimized);
            assert_eq!(
                distinct(iterated_refs(rewritten.as_mut())),
                distinct(iterated_refs(original.as_mut())),
                "[{}] {shape:?} => {optimized:?}",
                h.name
            );
        }
    });
}

#[test]
fn test_optimize_is_idempotent() {
    for_each_fixture_store(|h| {
        for shape in shapes() {
            let (once, _) = optimize(shape, h.store.as_ref());
            let (twice, changed) = optimize(once.clone(), h.store.as_ref());
            assert!(!changed, "[{}] {once:?}", h.name);
            assert_eq!(twice, once, "[{}]", h.name);
        }
    });
}

#[test]
fn test_known_rewrites() {
    for_each_fixture_store(|h| {
        let (b, d) = (h.node("B"), h.node("D"));
        let shapes = shapes();
        assert_eq!(
            optimize(shapes[2].clone(), h.store.as_ref()),
            (Shape::Fixed(vec![b, d]), true),
            "[{}]",
            h.name
        );
        assert_eq!(
            optimize(shapes[3].clone(), h.store.as_ref()),
            (Shape::Null, true),
            "[{}]",
            h.name
        );
        assert_eq!(
            optimize(shapes[4].clone(), h.store.as_ref()),
            (Shape::AllQuads, true),
            "[{}]",
            h.name
        );
        for mixed in &shapes[6..8] {
            assert_eq!(
                optimize(mixed.clone(), h.store.as_ref()),
                (Shape::Null, true),
                "[{}] {mixed:?}",
                h.name
            );
        }
    });
}
