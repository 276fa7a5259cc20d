//! Test removing quads and writer failure tolerance.

use crate::conformance::helpers::*;
use crate::types::{Direction, Quad};
use crate::writer::WriterOptions;

#[test]
fn test_remove_missing_quad() {
    for_each_fixture_store(|h| {
        let q = Quad::triple("E", "follows", "F");
        let strict = h.writer(WriterOptions::default());
        strict.remove_quad(q.clone()).unwrap();
        h.settle();
        let size = h.store.size();

        let err = strict.remove_quad(q.clone()).unwrap_err();
        assert!(err.is_quad_not_exist(), "[{}] {err}", h.name);
        assert_eq!(h.store.size(), size, "[{}]", h.name);

        let lenient = h.writer(WriterOptions {
            ignore_missing: true,
            ..WriterOptions::default()
        });
        lenient.remove_quad(q).unwrap();
        assert_eq!(h.store.size(), size, "[{}]", h.name);
    });
}

#[test]
fn test_add_duplicate_quad() {
    for_each_fixture_store(|h| {
        let q = Quad::triple("A", "follows", "B");
        let size = h.store.size();

        let err = h.writer(WriterOptions::default()).add_quad(q.clone()).unwrap_err();
        assert!(err.is_quad_exists(), "[{}] {err}", h.name);

        h.writer(WriterOptions {
            ignore_duplicate: true,
            ..WriterOptions::default()
        })
        .add_quad(q)
        .unwrap();
        assert_eq!(h.store.size(), size, "[{}]", h.name);
    });
}

#[test]
fn test_failed_batch_changes_nothing() {
    for_each_fixture_store(|h| {
        let size = h.store.size();
        let err = h
            .writer(WriterOptions::default())
            .add_quad_set(vec![
                Quad::triple("X", "follows", "Y"),
                Quad::triple("A", "follows", "B"),
            ])
            .unwrap_err();
        assert!(err.is_quad_exists(), "[{}]", h.name);
        assert_eq!(h.store.size(), size, "[{}]", h.name);
        assert_eq!(h.store.quad_ref(&Quad::triple("X", "follows", "Y")), None);
        assert_eq!(h.store.value_of(&"X".into()), None, "[{}]", h.name);
    });
}

#[test]
fn test_remove_leaves_other_quads() {
    for_each_fixture_store(|h| {
        let ef = Quad::triple("E", "follows", "F");
        h.writer(WriterOptions::default())
            .remove_quad(ef.clone())
            .unwrap();
        h.settle();

        if let Some(e) = h.store.value_of(&"E".into()) {
            let mut it = h.store.quad_iterator(Direction::Subject, e);
            assert!(iterated_refs(it.as_mut()).is_empty(), "[{}]", h.name);
        }
        let mut all = h.store.quads_all_iterator();
        assert_eq!(
            h.quads(all.as_mut()),
            h.expected_quads(&fixture_without(&[ef])),
            "[{}]",
            h.name
        );
    });
}
