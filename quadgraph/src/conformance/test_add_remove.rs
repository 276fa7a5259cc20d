//! Test mixed add and remove batches against the fixture.

use crate::conformance::helpers::*;
use crate::types::{Quad, Value};
use crate::writer::WriterOptions;

#[test]
fn test_add_remove() {
    for_each_fixture_store(|h| {
        let lenient = h.writer(WriterOptions {
            ignore_duplicate: true,
            ..WriterOptions::default()
        });
        lenient
            .add_quad_set(vec![
                Quad::triple("A", "follows", "B"),
                Quad::triple("F", "follows", "B"),
                Quad::triple("C", "follows", "D"),
                Quad::triple("X", "follows", "B"),
            ])
            .unwrap();
        assert_eq!(h.store.size(), h.expected_size(13, 12, 12), "[{}]", h.name);

        let mut all = fixture_values();
        all.push(Value::string("X"));
        let mut nodes = h.store.nodes_all_iterator();
        assert_eq!(h.values(nodes.as_mut()), h.expected_values(all), "[{}]", h.name);

        let strict = h.writer(WriterOptions::default());
        let xb = Quad::triple("X", "follows", "B");
        strict.remove_quad(xb.clone()).unwrap();
        let err = strict.remove_quad(xb).unwrap_err();
        assert!(err.is_quad_not_exist(), "[{}]", h.name);

        h.settle();
        assert_eq!(h.store.size(), h.expected_size(12, 11, 12), "[{}]", h.name);
        assert_eq!(
            h.store.value_of(&Value::string("X")).is_some(),
            !h.reclaims_values(),
            "[{}]",
            h.name
        );
    });
}

#[test]
fn test_remove_then_add_in_one_batch() {
    for_each_fixture_store(|h| {
        let q = Quad::triple("E", "follows", "F");
        let e = h.node("E");
        h.writer(WriterOptions::default())
            .apply(&[
                crate::store::Delta::delete(q.clone()),
                crate::store::Delta::add(q.clone()),
            ])
            .unwrap();
        h.settle();
        assert!(h.store.quad_ref(&q).is_some(), "[{}]", h.name);
        assert_eq!(h.store.size(), h.expected_size(11, 11, 11), "[{}]", h.name);
        // Immediate GC may have reissued E's ref; the value must still resolve.
        assert_eq!(h.store.name_of(h.node("E")), Some(h.v("E")));
        if !h.reclaims_values() {
            assert_eq!(h.node("E"), e);
        }
    });
}
