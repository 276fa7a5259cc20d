//! Test removing every quad that references a value.

use crate::conformance::helpers::*;
use crate::types::{Quad, Value};
use crate::writer::WriterOptions;

#[test]
fn test_node_delete() {
    for_each_fixture_store(|h| {
        h.writer(WriterOptions::default())
            .remove_node(&Value::string("D"))
            .unwrap();
        h.settle();

        let removed = [
            Quad::triple("C", "follows", "D"),
            Quad::triple("D", "follows", "B"),
            Quad::triple("D", "follows", "G"),
            Quad::make("D", "status", "cool", Some("status_graph")),
        ];
        for q in &removed {
            assert_eq!(h.store.quad_ref(q), None, "[{}] {q}", h.name);
        }
        let mut quads = h.store.quads_all_iterator();
        assert_eq!(
            h.quads(quads.as_mut()),
            h.expected_quads(&fixture_without(&removed)),
            "[{}]",
            h.name
        );
        assert_eq!(h.store.size(), h.expected_size(7, 10, 11), "[{}]", h.name);

        let mut remaining = fixture_values();
        if h.reclaims_values() {
            remaining.retain(|v| *v != Value::string("D"));
        }
        let mut nodes = h.store.nodes_all_iterator();
        assert_eq!(
            h.values(nodes.as_mut()),
            h.expected_values(remaining),
            "[{}]",
            h.name
        );
    });
}

#[test]
fn test_node_delete_unknown_value() {
    for_each_fixture_store(|h| {
        let size = h.store.size();
        h.writer(WriterOptions::default())
            .remove_node(&Value::string("nobody"))
            .unwrap();
        assert_eq!(h.store.size(), size, "[{}]", h.name);
    });
}
