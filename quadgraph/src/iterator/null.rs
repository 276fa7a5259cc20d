//! The empty iterator.

use std::any::Any;
use std::collections::HashMap;

use super::{BoxIterator, Context, GraphIterator, IteratorType};
use crate::error::GraphError;
use crate::types::Ref;

/// An iterator with no results. Optimizers produce it for provably empty plans.
#[derive(Debug, Default)]
pub struct Null;

impl Null {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// A boxed `Null`.
    #[must_use]
    pub fn boxed() -> BoxIterator {
        Box::new(Self)
    }
}

impl GraphIterator for Null {
    fn next(&mut self, _ctx: &Context) -> bool {
        false
    }

    fn result(&self) -> Option<Ref> {
        None
    }

    fn err(&self) -> Option<&GraphError> {
        None
    }

    fn contains(&mut self, _ctx: &Context, _value: Ref) -> bool {
        false
    }

    fn next_path(&mut self, _ctx: &Context) -> bool {
        false
    }

    fn size(&self) -> (i64, bool) {
        (0, true)
    }

    fn reset(&mut self) {}

    fn optimize(self: Box<Self>) -> (BoxIterator, bool) {
        (self, false)
    }

    fn close(&mut self) -> Result<(), GraphError> {
        Ok(())
    }

    fn iterator_type(&self) -> IteratorType {
        IteratorType::Null
    }

    fn tag_results(&self, _dst: &mut HashMap<String, Ref>) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
