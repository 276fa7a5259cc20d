//! Test that every value kind survives the value table.

use chrono::{DateTime, Duration, Utc};

use crate::conformance::helpers::*;
use crate::types::{Quad, TimePrecision, Value};

fn typed_values() -> Vec<Value> {
    let t = DateTime::<Utc>::from_timestamp(1_700_000_000, 123_456_789).unwrap();
    vec![
        Value::iri("http://example.org/alice"),
        Value::bnode("n1"),
        Value::string("alice"),
        Value::typed("42", "http://example.org/answer"),
        Value::lang("bonjour", "fr"),
        Value::Int(-7),
        Value::Float(2.5),
        Value::Bool(true),
        Value::Time(t),
        Value::raw("opaque"),
    ]
}

#[test]
fn test_load_typed_quads() {
    for_each_store(|h| {
        let values = typed_values();
        let quads: Vec<Quad> = values
            .iter()
            .map(|v| Quad::triple(Value::iri("subject"), Value::iri("has"), v.clone()))
            .collect();
        h.load(&quads);

        for value in values {
            let node = h.node(value.clone());
            let name = h.store.name_of(node).unwrap();
            assert_eq!(name, h.v(value.clone()), "[{}] {value}", h.name);
            assert_eq!(h.store.value_of(&name), Some(node), "[{}] {value}", h.name);
        }
        for q in &quads {
            let quad = h.store.quad_ref(q).unwrap();
            assert_eq!(h.store.quad(quad), Some(h.caps.normalize_quad(q)));
        }
    });
}

#[test]
fn test_time_normalization() {
    for_each_store(|h| {
        let t = DateTime::<Utc>::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        h.load(&[Quad::triple("event", "at", t)]);

        let stored = h.node(t);
        if h.caps.time_precision == TimePrecision::Millis && !h.caps.untyped {
            assert_eq!(
                h.store.name_of(stored),
                Some(Value::Time(t - Duration::nanoseconds(456_789)))
            );
            // Anything in the same millisecond resolves to the same value.
            let close = t + Duration::nanoseconds(1);
            assert_eq!(h.store.value_of(&close.into()), Some(stored), "[{}]", h.name);
        } else if h.caps.time_precision == TimePrecision::Micros && h.caps.time_round {
            // 123_456_789ns rounds up to the next microsecond.
            assert_eq!(
                h.store.name_of(stored),
                Some(Value::Time(t + Duration::nanoseconds(211))),
                "[{}]",
                h.name
            );
            let close = t - Duration::nanoseconds(289);
            assert_eq!(h.store.value_of(&close.into()), Some(stored), "[{}]", h.name);
            let below = t - Duration::nanoseconds(290);
            assert_ne!(h.store.value_of(&below.into()), Some(stored), "[{}]", h.name);
        } else {
            assert_eq!(h.store.name_of(stored), Some(h.v(t)), "[{}]", h.name);
        }
    });
}
