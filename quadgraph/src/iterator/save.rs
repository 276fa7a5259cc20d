//! Transparent wrapper that tags its sub-iterator's result.

use std::any::Any;
use std::collections::HashMap;

use super::{BoxIterator, Context, GraphIterator, IteratorType, Null, RefKind, discard};
use crate::error::GraphError;
use crate::types::Ref;

/// Records the sub-iterator's current result under a tag.
///
/// Otherwise transparent. Parents collect tags through `tag_results`, which
/// is how a caller observes the binding an inner iterator holds while
/// `next_path` walks alternate paths.
#[derive(Debug)]
pub struct Save {
    sub: BoxIterator,
    tag: String,
}

impl Save {
    #[must_use]
    pub fn new(sub: BoxIterator, tag: impl Into<String>) -> Self {
        Self {
            sub,
            tag: tag.into(),
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl GraphIterator for Save {
    fn next(&mut self, ctx: &Context) -> bool {
        self.sub.next(ctx)
    }

    fn result(&self) -> Option<Ref> {
        self.sub.result()
    }

    fn err(&self) -> Option<&GraphError> {
        self.sub.err()
    }

    fn contains(&mut self, ctx: &Context, value: Ref) -> bool {
        self.sub.contains(ctx, value)
    }

    fn next_path(&mut self, ctx: &Context) -> bool {
        self.sub.next_path(ctx)
    }

    fn size(&self) -> (i64, bool) {
        self.sub.size()
    }

    fn reset(&mut self) {
        self.sub.reset();
    }

    fn optimize(self: Box<Self>) -> (BoxIterator, bool) {
        let Self { sub, tag } = *self;
        let (sub, changed) = sub.optimize();
        if sub.iterator_type() == IteratorType::Null {
            discard(sub);
            return (Null::boxed(), true);
        }
        (Box::new(Self { sub, tag }), changed)
    }

    fn close(&mut self) -> Result<(), GraphError> {
        self.sub.close()
    }

    fn iterator_type(&self) -> IteratorType {
        IteratorType::Save
    }

    fn result_kind(&self) -> Option<RefKind> {
        self.sub.result_kind()
    }

    fn tag_results(&self, dst: &mut HashMap<String, Ref>) {
        if let Some(result) = self.sub.result() {
            dst.insert(self.tag.clone(), result);
        }
        self.sub.tag_results(dst);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
