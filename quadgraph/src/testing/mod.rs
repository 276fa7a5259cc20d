//! Fixtures and iteration helpers shared by unit and conformance tests.

use std::sync::{Arc, Once};

use tracing_subscriber::EnvFilter;

use crate::iterator::{Context, GraphIterator};
use crate::store::{MemStore, MemStoreOptions, StoreRef};
use crate::types::{Quad, Ref, Value, sort_quads};
use crate::writer::{Writer, WriterOptions};

static TRACING: Once = Once::new();

/// Install a test log subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `quadgraph=debug`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quadgraph=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// The fixture graph.
///
/// ```text
/// +---+                        +---+
/// | A |-------               ->| F |<--
/// +---+       \------>+---+-/  +---+   \--+---+
///              ------>|#B#|      |        | E |
/// +---+-------/      >+---+      |        +---+
/// | C |             /            v
/// +---+           -/           +---+
///   ----    +---+/             |#G#|
///       \-->|#D#|------------->+---+
///           +---+
/// ```
///
/// Plus `B`, `D` and `G` have status `cool` in `status_graph`.
#[must_use]
pub fn make_quad_set() -> Vec<Quad> {
    vec![
        Quad::triple("A", "follows", "B"),
        Quad::triple("C", "follows", "B"),
        Quad::triple("C", "follows", "D"),
        Quad::triple("D", "follows", "B"),
        Quad::triple("B", "follows", "F"),
        Quad::triple("F", "follows", "G"),
        Quad::triple("D", "follows", "G"),
        Quad::triple("E", "follows", "F"),
        Quad::make("B", "status", "cool", Some("status_graph")),
        Quad::make("D", "status", "cool", Some("status_graph")),
        Quad::make("G", "status", "cool", Some("status_graph")),
    ]
}

/// A store with the given options holding `quads`.
pub fn new_store(options: MemStoreOptions, quads: &[Quad]) -> StoreRef {
    init_tracing();
    let store: StoreRef = Arc::new(MemStore::new(options));
    if !quads.is_empty() {
        Writer::new(&store, WriterOptions::default())
            .add_quad_set(quads.to_vec())
            .unwrap();
    }
    store
}

/// A default store holding `quads`.
pub fn store_with(quads: &[Quad]) -> StoreRef {
    new_store(MemStoreOptions::default(), quads)
}

/// A default store holding the fixture graph.
pub fn fixture_store() -> StoreRef {
    store_with(&make_quad_set())
}

/// Resolve a plain string value that must be stored.
pub fn node(store: &StoreRef, name: &str) -> Ref {
    store
        .value_of(&Value::string(name))
        .unwrap_or_else(|| panic!("{name} is not stored"))
}

/// Drain an iterator, failing the test on an iteration error.
pub fn iterated_refs(it: &mut dyn GraphIterator) -> Vec<Ref> {
    let ctx = Context::background();
    let mut out = Vec::new();
    while it.next(&ctx) {
        out.push(it.result().unwrap());
    }
    assert!(it.err().is_none(), "iteration failed: {:?}", it.err());
    out
}

/// Drain a quad iterator into sorted quads.
pub fn iterated_quads(store: &StoreRef, it: &mut dyn GraphIterator) -> Vec<Quad> {
    let mut quads: Vec<Quad> = iterated_refs(it)
        .into_iter()
        .map(|r| store.quad(r).unwrap())
        .collect();
    sort_quads(&mut quads);
    quads
}

/// Drain a node iterator into values sorted by canonical form.
pub fn iterated_values(store: &StoreRef, it: &mut dyn GraphIterator) -> Vec<Value> {
    let mut values: Vec<Value> = iterated_refs(it)
        .into_iter()
        .map(|r| store.name_of(r).unwrap())
        .collect();
    values.sort_by_cached_key(ToString::to_string);
    values
}

/// Drain a node iterator of plain strings into sorted text.
pub fn iterated_strings(store: &StoreRef, it: &mut dyn GraphIterator) -> Vec<String> {
    let mut names: Vec<String> = iterated_values(store, it)
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect();
    names.sort();
    names
}
