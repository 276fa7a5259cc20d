//! Test loading a single quad into an empty store.

use crate::conformance::helpers::*;
use crate::types::{Direction, Quad, Value};
use crate::writer::WriterOptions;

#[test]
fn test_load_one_quad() {
    for_each_store(|h| {
        let q = Quad::triple("Something", "points_to", "Something Else");
        h.writer(WriterOptions::default()).add_quad(q.clone()).unwrap();

        for name in ["Something", "points_to", "Something Else"] {
            let node = h.node(name);
            assert_eq!(h.store.name_of(node), Some(h.v(name)), "[{}]", h.name);
        }
        assert_eq!(h.store.size(), h.expected_size(1, 3, 3), "[{}]", h.name);

        let quad = h.store.quad_ref(&q).unwrap();
        assert_eq!(h.store.quad(quad), Some(h.caps.normalize_quad(&q)));
        assert_eq!(
            h.store.quad_direction(quad, Direction::Subject),
            Some(h.node("Something"))
        );
        assert_eq!(
            h.store.quad_direction(quad, Direction::Object),
            Some(h.node("Something Else"))
        );
        assert_eq!(h.store.quad_direction(quad, Direction::Label), None);
    });
}

#[test]
fn test_unknown_values_do_not_resolve() {
    for_each_fixture_store(|h| {
        assert_eq!(h.store.value_of(&Value::string("Z")), None, "[{}]", h.name);
        assert_eq!(h.store.quad_ref(&Quad::triple("A", "follows", "G")), None);
        // A node ref is not a quad ref.
        assert_eq!(h.store.quad(h.node("A")), None);
    });
}

#[test]
fn test_value_of_roundtrips_name_of() {
    for_each_fixture_store(|h| {
        for value in fixture_values() {
            let node = h.node(value.clone());
            let name = h.store.name_of(node).unwrap();
            assert_eq!(name, h.v(value), "[{}]", h.name);
            assert_eq!(h.store.value_of(&name), Some(node), "[{}]", h.name);
        }
    });
}
