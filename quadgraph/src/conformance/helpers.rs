//! Common helpers for conformance tests.

use std::sync::Arc;

use crate::iterator::GraphIterator;
use crate::store::{Capabilities, MemStore, MemStoreOptions, NodeGc, SizeAccounting, StoreRef};
use crate::testing::{init_tracing, make_quad_set};
use crate::types::{Quad, Ref, TimePrecision, Value, sort_quads};
use crate::writer::{Writer, WriterOptions};

pub use crate::testing::{iterated_quads, iterated_refs, iterated_values};

/// A store under test together with the concrete handle used for GC ticks.
pub struct Harness {
    pub name: &'static str,
    pub mem: MemStore,
    pub store: StoreRef,
    pub caps: Capabilities,
}

/// Every store configuration the suite runs against.
#[must_use]
pub fn configs() -> Vec<(&'static str, MemStoreOptions)> {
    let base = MemStoreOptions::default();
    vec![
        ("default", base),
        (
            "quads-only",
            MemStoreOptions {
                size_accounting: SizeAccounting::QuadsOnly,
                ..base
            },
        ),
        (
            "deferred-gc",
            MemStoreOptions {
                node_gc: NodeGc::Deferred,
                ..base
            },
        ),
        (
            "no-gc",
            MemStoreOptions {
                node_gc: NodeGc::Disabled,
                ..base
            },
        ),
        (
            "untyped",
            MemStoreOptions {
                untyped: true,
                ..base
            },
        ),
        (
            "millis-optimized",
            MemStoreOptions {
                time_precision: TimePrecision::Millis,
                optimizes_comparison: true,
                ..base
            },
        ),
        (
            "micros-round",
            MemStoreOptions {
                time_precision: TimePrecision::Micros,
                time_round: true,
                ..base
            },
        ),
        (
            "untyped-quads-only-deferred",
            MemStoreOptions {
                untyped: true,
                size_accounting: SizeAccounting::QuadsOnly,
                node_gc: NodeGc::Deferred,
                ..base
            },
        ),
    ]
}

/// Run `f` once per configuration with an empty store.
pub fn for_each_store(mut f: impl FnMut(Harness)) {
    init_tracing();
    for (name, options) in configs() {
        tracing::debug!(config = name, "running conformance scenario");
        f(Harness::new(name, options));
    }
}

/// Run `f` once per configuration with the fixture graph loaded.
pub fn for_each_fixture_store(mut f: impl FnMut(Harness)) {
    for_each_store(|h| {
        h.load(&make_quad_set());
        f(h);
    });
}

impl Harness {
    #[must_use]
    pub fn new(name: &'static str, options: MemStoreOptions) -> Self {
        let mem = MemStore::new(options);
        let store: StoreRef = Arc::new(mem.clone());
        let caps = store.capabilities();
        Self {
            name,
            mem,
            store,
            caps,
        }
    }

    pub fn load(&self, quads: &[Quad]) {
        self.writer(WriterOptions::default())
            .add_quad_set(quads.to_vec())
            .unwrap();
    }

    #[must_use]
    pub fn writer(&self, options: WriterOptions) -> Writer {
        Writer::new(&self.store, options)
    }

    /// Run deferred GC to completion so the store matches immediate GC.
    pub fn settle(&self) {
        if self.caps.node_gc == NodeGc::Deferred {
            let result = self.mem.gc_tick(usize::MAX).unwrap();
            assert_eq!(result.nodes_remaining, 0, "[{}]", self.name);
        }
    }

    /// Whether released values eventually leave the value table.
    #[must_use]
    pub fn reclaims_values(&self) -> bool {
        self.caps.node_gc != NodeGc::Disabled
    }

    /// The value this store holds for `value`.
    #[must_use]
    pub fn v(&self, value: impl Into<Value>) -> Value {
        self.caps.normalize(&value.into())
    }

    /// Resolve a value that must be stored.
    #[must_use]
    pub fn node(&self, value: impl Into<Value>) -> Ref {
        let value = value.into();
        self.store
            .value_of(&value)
            .unwrap_or_else(|| panic!("[{}] {value} is not stored", self.name))
    }

    /// Expected `size()` for a settled store.
    ///
    /// `live_values` are the values still referenced; `all_values` counts
    /// every value ever stored, which is what remains when GC is disabled.
    #[must_use]
    pub fn expected_size(&self, quads: i64, live_values: i64, all_values: i64) -> i64 {
        match self.caps.size_accounting {
            SizeAccounting::QuadsOnly => quads,
            SizeAccounting::QuadsAndValues if self.reclaims_values() => quads + live_values,
            SizeAccounting::QuadsAndValues => quads + all_values,
        }
    }

    /// Normalized, sorted quads as `iterated_quads` returns them.
    #[must_use]
    pub fn expected_quads(&self, quads: &[Quad]) -> Vec<Quad> {
        let mut quads: Vec<Quad> = quads.iter().map(|q| self.caps.normalize_quad(q)).collect();
        sort_quads(&mut quads);
        quads
    }

    /// Normalized values sorted as `iterated_values` returns them.
    #[must_use]
    pub fn expected_values(&self, values: Vec<Value>) -> Vec<Value> {
        let mut values: Vec<Value> = values.iter().map(|v| self.caps.normalize(v)).collect();
        values.sort_by_cached_key(ToString::to_string);
        values
    }

    #[must_use]
    pub fn quads(&self, it: &mut dyn GraphIterator) -> Vec<Quad> {
        iterated_quads(&self.store, it)
    }

    #[must_use]
    pub fn values(&self, it: &mut dyn GraphIterator) -> Vec<Value> {
        iterated_values(&self.store, it)
    }
}

/// Plain string values.
#[must_use]
pub fn strings(names: &[&str]) -> Vec<Value> {
    names.iter().map(|n| Value::string(*n)).collect()
}

/// The fixture minus the given quads.
#[must_use]
pub fn fixture_without(removed: &[Quad]) -> Vec<Quad> {
    make_quad_set()
        .into_iter()
        .filter(|q| !removed.contains(q))
        .collect()
}

/// Every distinct value of the fixture graph.
#[must_use]
pub fn fixture_values() -> Vec<Value> {
    strings(&[
        "A",
        "B",
        "C",
        "D",
        "E",
        "F",
        "G",
        "follows",
        "status",
        "cool",
        "status_graph",
    ])
}
