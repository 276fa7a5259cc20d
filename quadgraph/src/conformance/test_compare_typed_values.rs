//! Test comparison filters over typed values, with and without the
//! backend's shape rewrite.

use chrono::{DateTime, Duration, Utc};

use crate::conformance::helpers::*;
use crate::iterator::{Comparison, Operator};
use crate::shape::{Shape, build_iterator, optimize};
use crate::types::{Quad, Value};

fn tzero() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_600_000_000, 0).unwrap()
}

fn typed_quads() -> Vec<Quad> {
    let t = tzero();
    vec![
        Quad::triple(
            Value::bnode("alice"),
            Value::bnode("bob"),
            Value::bnode("charlie"),
        ),
        Quad::make(
            Value::iri("alice"),
            Value::iri("bob"),
            Value::iri("charlie"),
            Some(Value::iri("dani")),
        ),
        Quad::make("alice", "bob", "charlie", Some("dani")),
        Quad::make(100_i64, 112_i64, 110_i64, Some(20_i64)),
        Quad::make(
            t,
            t + Duration::hours(1),
            t + Duration::hours(49),
            Some(t + Duration::days(365)),
        ),
    ]
}

fn cases() -> Vec<(Value, Operator, Vec<Value>)> {
    let t = tzero();
    let time = |d: Duration| Value::Time(t + d);
    vec![
        (Value::bnode("b"), Operator::Lt, vec![Value::bnode("alice")]),
        (
            Value::bnode("bob"),
            Operator::Lte,
            vec![Value::bnode("alice"), Value::bnode("bob")],
        ),
        (Value::string("b"), Operator::Lt, vec![Value::string("alice")]),
        (
            Value::string("bob"),
            Operator::Lte,
            vec![Value::string("alice"), Value::string("bob")],
        ),
        (
            Value::string("b"),
            Operator::Gte,
            strings(&["bob", "charlie", "dani"]),
        ),
        (Value::iri("b"), Operator::Lt, vec![Value::iri("alice")]),
        (
            Value::iri("b"),
            Operator::Gte,
            vec![Value::iri("bob"), Value::iri("charlie"), Value::iri("dani")],
        ),
        (Value::Int(111), Operator::Gte, vec![Value::Int(112)]),
        (
            Value::Int(110),
            Operator::Gte,
            vec![Value::Int(110), Value::Int(112)],
        ),
        (Value::Int(20), Operator::Lt, Vec::new()),
        (Value::Int(20), Operator::Lte, vec![Value::Int(20)]),
        (
            time(Duration::hours(1)),
            Operator::Lte,
            vec![time(Duration::zero()), time(Duration::hours(1))],
        ),
        (
            time(Duration::hours(1)),
            Operator::Gt,
            vec![time(Duration::hours(49)), time(Duration::days(365))],
        ),
    ]
}

#[test]
fn test_compare_typed_values() {
    for_each_store(|h| {
        if h.caps.untyped {
            return;
        }
        h.load(&typed_quads());

        for (pivot, op, expected) in cases() {
            let expected = h.expected_values(expected);
            let mut it = Comparison::new(
                h.store.clone(),
                h.store.nodes_all_iterator(),
                op,
                pivot.clone(),
            );
            assert_eq!(h.values(&mut it), expected, "[{}] {op} {pivot}", h.name);

            let shape = Shape::compare(Shape::AllNodes, op, pivot.clone());
            let (optimized, changed) = optimize(shape.clone(), h.store.as_ref());
            assert_eq!(
                changed, h.caps.optimizes_comparison,
                "[{}] {op} {pivot}",
                h.name
            );
            if changed {
                assert_ne!(optimized, shape, "[{}] {op} {pivot}", h.name);
            } else {
                assert_eq!(optimized, shape, "[{}] {op} {pivot}", h.name);
            }

            let mut built = build_iterator(&h.store, &optimized);
            assert_eq!(
                h.values(built.as_mut()),
                expected,
                "[{}] optimized {op} {pivot}",
                h.name
            );
        }
    });
}

#[test]
fn test_mixed_kinds_never_match() {
    for_each_store(|h| {
        if h.caps.untyped {
            return;
        }
        h.load(&typed_quads());
        let mut it = Comparison::new(
            h.store.clone(),
            h.store.nodes_all_iterator(),
            Operator::Gte,
            Value::Float(0.0),
        );
        assert!(h.values(&mut it).is_empty(), "[{}]", h.name);
    });
}
