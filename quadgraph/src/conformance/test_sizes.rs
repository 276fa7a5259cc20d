//! Test store size accounting and value reference counts.

use crate::conformance::helpers::*;
use crate::types::{Quad, Value};
use crate::writer::WriterOptions;

#[test]
fn test_fixture_size() {
    for_each_fixture_store(|h| {
        assert_eq!(h.store.size(), h.expected_size(11, 11, 11), "[{}]", h.name);
    });
}

#[test]
fn test_size_after_remove() {
    for_each_fixture_store(|h| {
        h.writer(WriterOptions::default())
            .remove_quad(Quad::triple("A", "follows", "B"))
            .unwrap();

        if h.mem.pending_gc().unwrap() > 0 {
            // Released but not yet reclaimed values stay resolvable.
            assert!(h.store.value_of(&Value::string("A")).is_some(), "[{}]", h.name);
        }
        h.settle();

        assert_eq!(h.store.size(), h.expected_size(10, 10, 11), "[{}]", h.name);
        assert_eq!(
            h.store.value_of(&Value::string("A")).is_some(),
            !h.reclaims_values(),
            "[{}]",
            h.name
        );
    });
}

#[test]
fn test_value_sizer() {
    for_each_fixture_store(|h| {
        let Some(sizer) = h.store.value_sizer() else {
            return;
        };
        assert_eq!(sizer.size_of(h.node("B")), Some(5), "[{}]", h.name);
        assert_eq!(sizer.size_of(h.node("status")), Some(3), "[{}]", h.name);
        assert_eq!(sizer.size_of(h.node("status_graph")), Some(3), "[{}]", h.name);

        h.writer(WriterOptions::default())
            .remove_quad(Quad::triple("A", "follows", "B"))
            .unwrap();
        assert_eq!(sizer.size_of(h.node("B")), Some(4), "[{}]", h.name);
    });
}

#[test]
fn test_self_loop_counts_once() {
    for_each_store(|h| {
        h.load(&[Quad::triple("A", "A", "A")]);
        assert_eq!(h.store.size(), h.expected_size(1, 1, 1), "[{}]", h.name);
        if let Some(sizer) = h.store.value_sizer() {
            assert_eq!(sizer.size_of(h.node("A")), Some(1), "[{}]", h.name);
        }
    });
}
