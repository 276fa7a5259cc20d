//! Mutation façade over a quad store.
//!
//! Every call turns into one `apply_deltas` batch, so each call is atomic.
//! Reference counting and value reclamation are the store's job; the writer
//! only decides which quads a call touches and which failures it tolerates.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::GraphError;
use crate::iterator::Context;
use crate::store::{Delta, IgnoreOptions, StoreRef};
use crate::types::{Direction, Quad, Ref, Value};

/// Failure tolerance of a `Writer`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterOptions {
    /// Adding a quad that already exists is skipped instead of failing.
    pub ignore_duplicate: bool,
    /// Removing a quad that does not exist is skipped instead of failing.
    pub ignore_missing: bool,
}

impl From<WriterOptions> for IgnoreOptions {
    fn from(opts: WriterOptions) -> Self {
        Self {
            ignore_dup: opts.ignore_duplicate,
            ignore_missing: opts.ignore_missing,
        }
    }
}

/// Writes quads to a store.
#[derive(Debug, Clone)]
pub struct Writer {
    store: StoreRef,
    options: WriterOptions,
}

impl Writer {
    #[must_use]
    pub fn new(store: &StoreRef, options: WriterOptions) -> Self {
        Self {
            store: Arc::clone(store),
            options,
        }
    }

    #[must_use]
    pub const fn options(&self) -> WriterOptions {
        self.options
    }

    /// Add one quad.
    ///
    /// # Errors
    ///
    /// `QuadExists` if the quad is stored and duplicates are not ignored.
    pub fn add_quad(&self, quad: Quad) -> Result<(), GraphError> {
        self.apply(&[Delta::add(quad)])
    }

    /// Add a batch of quads in one mutation.
    ///
    /// With `ignore_duplicate` set, stored quads and repeats within the batch
    /// are skipped. Otherwise the first duplicate fails the whole batch and
    /// nothing is added.
    pub fn add_quad_set(&self, quads: Vec<Quad>) -> Result<(), GraphError> {
        let deltas: Vec<Delta> = quads.into_iter().map(Delta::add).collect();
        self.apply(&deltas)
    }

    /// Remove one quad.
    ///
    /// # Errors
    ///
    /// `QuadNotExist` if the quad is not stored and missing quads are not
    /// ignored.
    pub fn remove_quad(&self, quad: Quad) -> Result<(), GraphError> {
        self.apply(&[Delta::delete(quad)])
    }

    /// Remove every quad that references `value` in any direction.
    ///
    /// A value that is not stored is a no-op.
    pub fn remove_node(&self, value: &Value) -> Result<(), GraphError> {
        let Some(node) = self.store.value_of(value) else {
            return Ok(());
        };
        let quads = self.quads_referencing(node)?;
        if quads.is_empty() {
            return Ok(());
        }
        tracing::debug!(node = %node, quads = quads.len(), "removing node");
        let deltas: Vec<Delta> = quads.into_iter().map(Delta::delete).collect();
        self.store.apply_deltas(
            &deltas,
            IgnoreOptions {
                ignore_dup: self.options.ignore_duplicate,
                ignore_missing: true,
            },
        )
    }

    /// Apply arbitrary deltas with this writer's tolerance.
    pub fn apply(&self, deltas: &[Delta]) -> Result<(), GraphError> {
        self.store.apply_deltas(deltas, self.options.into())
    }

    fn quads_referencing(&self, node: Ref) -> Result<Vec<Quad>, GraphError> {
        let ctx = Context::background();
        let mut seen = HashSet::new();
        let mut quads = Vec::new();
        for direction in Direction::ALL {
            let mut it = self.store.quad_iterator(direction, node);
            while it.next(&ctx) {
                let Some(quad_ref) = it.result() else {
                    continue;
                };
                if seen.insert(quad_ref) {
                    if let Some(quad) = self.store.quad(quad_ref) {
                        quads.push(quad);
                    }
                }
            }
            let err = it.err().cloned();
            it.close()?;
            if let Some(err) = err {
                return Err(err);
            }
        }
        Ok(quads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;
    use crate::testing::{fixture_store, make_quad_set};

    fn writer(opts: WriterOptions) -> (StoreRef, Writer) {
        let store: StoreRef = Arc::new(MemStore::default());
        let w = Writer::new(&store, opts);
        (store, w)
    }

    #[test]
    fn test_add_then_duplicate() {
        let (store, w) = writer(WriterOptions::default());
        let q = Quad::triple("A", "follows", "B");
        w.add_quad(q.clone()).unwrap();
        let err = w.add_quad(q).unwrap_err();
        assert!(err.is_quad_exists());
        assert_eq!(store.size(), 4);
    }

    #[test]
    fn test_remove_twice_reports_not_exist() {
        let store = fixture_store();
        let w = Writer::new(&store, WriterOptions::default());
        let q = Quad::triple("E", "follows", "F");
        w.remove_quad(q.clone()).unwrap();
        let size = store.size();
        let err = w.remove_quad(q).unwrap_err();
        assert!(err.is_quad_not_exist());
        assert_eq!(store.size(), size);
    }

    #[test]
    fn test_ignore_duplicate_skips_in_batch() {
        let (store, w) = writer(WriterOptions {
            ignore_duplicate: true,
            ..WriterOptions::default()
        });
        w.add_quad_set(make_quad_set()).unwrap();
        w.add_quad_set(vec![
            Quad::triple("A", "follows", "B"),
            Quad::triple("X", "follows", "B"),
            Quad::triple("X", "follows", "B"),
        ])
        .unwrap();
        assert_eq!(store.size(), 12 + 12);
    }

    #[test]
    fn test_remove_node() {
        let store = fixture_store();
        let w = Writer::new(&store, WriterOptions::default());
        w.remove_node(&Value::string("D")).unwrap();
        assert_eq!(store.value_of(&Value::string("D")), None);
        assert_eq!(store.quad_ref(&Quad::triple("C", "follows", "D")), None);
        assert!(store.quad_ref(&Quad::triple("C", "follows", "B")).is_some());

        // Unknown values are a no-op.
        w.remove_node(&Value::string("nope")).unwrap();
    }
}
