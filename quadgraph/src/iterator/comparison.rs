//! Range filter over a single value kind.

use std::any::Any;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    BoxIterator, Context, GraphIterator, IteratorType, Null, RefKind, check_cancelled, discard,
    take_err,
};
use crate::error::GraphError;
use crate::store::StoreRef;
use crate::types::{Ref, Value};

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Operator {
    /// Check whether `candidate.compare(pivot)` satisfies this operator.
    #[must_use]
    pub const fn matches(self, ord: Ordering) -> bool {
        match self {
            Self::Lt => matches!(ord, Ordering::Less),
            Self::Lte => !matches!(ord, Ordering::Greater),
            Self::Gt => matches!(ord, Ordering::Greater),
            Self::Gte => !matches!(ord, Ordering::Less),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        };
        f.write_str(symbol)
    }
}

/// Keeps the sub-iterator's values that compare to `pivot` under `op`.
///
/// Values of a different kind than the pivot are rejected; that is a normal
/// filter outcome, never an error.
#[derive(Debug)]
pub struct Comparison {
    store: StoreRef,
    sub: BoxIterator,
    op: Operator,
    pivot: Value,
    result: Option<Ref>,
    err: Option<GraphError>,
}

impl Comparison {
    #[must_use]
    pub fn new(store: StoreRef, sub: BoxIterator, op: Operator, pivot: Value) -> Self {
        Self {
            store,
            sub,
            op,
            pivot,
            result: None,
            err: None,
        }
    }

    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.op
    }

    #[must_use]
    pub const fn pivot(&self) -> &Value {
        &self.pivot
    }

    fn accepts(&self, candidate: Ref) -> bool {
        self.store
            .name_of(candidate)
            .and_then(|value| value.compare(&self.pivot))
            .is_some_and(|ord| self.op.matches(ord))
    }
}

impl GraphIterator for Comparison {
    fn next(&mut self, ctx: &Context) -> bool {
        loop {
            if check_cancelled(ctx, &mut self.err) {
                return false;
            }
            if !self.sub.next(ctx) {
                take_err(self.sub.as_ref(), &mut self.err);
                return false;
            }
            if let Some(candidate) = self.sub.result() {
                if self.accepts(candidate) {
                    self.result = Some(candidate);
                    return true;
                }
            }
        }
    }

    fn result(&self) -> Option<Ref> {
        self.result
    }

    fn err(&self) -> Option<&GraphError> {
        self.err.as_ref()
    }

    fn contains(&mut self, ctx: &Context, value: Ref) -> bool {
        if check_cancelled(ctx, &mut self.err) || !self.accepts(value) {
            return false;
        }
        if self.sub.contains(ctx, value) {
            self.result = Some(value);
            return true;
        }
        take_err(self.sub.as_ref(), &mut self.err);
        false
    }

    fn next_path(&mut self, ctx: &Context) -> bool {
        loop {
            if check_cancelled(ctx, &mut self.err) {
                return false;
            }
            if !self.sub.next_path(ctx) {
                take_err(self.sub.as_ref(), &mut self.err);
                return false;
            }
            if self.sub.result().is_some_and(|r| self.accepts(r)) {
                return true;
            }
        }
    }

    fn size(&self) -> (i64, bool) {
        let (size, _) = self.sub.size();
        (size / 2, false)
    }

    fn reset(&mut self) {
        self.sub.reset();
        self.result = None;
        self.err = None;
    }

    fn optimize(self: Box<Self>) -> (BoxIterator, bool) {
        let Self {
            store,
            sub,
            op,
            pivot,
            ..
        } = *self;
        let (sub, changed) = sub.optimize();
        if sub.iterator_type() == IteratorType::Null {
            discard(sub);
            return (Null::boxed(), true);
        }
        (Box::new(Self::new(store, sub, op, pivot)), changed)
    }

    fn close(&mut self) -> Result<(), GraphError> {
        self.sub.close()
    }

    fn iterator_type(&self) -> IteratorType {
        IteratorType::Comparison
    }

    fn result_kind(&self) -> Option<RefKind> {
        Some(RefKind::Node)
    }

    fn tag_results(&self, dst: &mut HashMap<String, Ref>) {
        self.sub.tag_results(dst);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{iterated_values, store_with};
    use crate::types::Quad;

    #[test]
    fn test_operator_matches() {
        assert!(Operator::Lt.matches(Ordering::Less));
        assert!(!Operator::Lt.matches(Ordering::Equal));
        assert!(Operator::Lte.matches(Ordering::Equal));
        assert!(!Operator::Gt.matches(Ordering::Equal));
        assert!(Operator::Gte.matches(Ordering::Equal));
        assert!(Operator::Gte.matches(Ordering::Greater));
        assert!(!Operator::Gte.matches(Ordering::Less));
    }

    #[test]
    fn test_filters_integers_and_rejects_other_kinds() {
        let store = store_with(&[
            Quad::triple("a", "n", 100_i64),
            Quad::triple("a", "n", 112_i64),
            Quad::triple("a", "n", 110_i64),
            Quad::triple("a", "n", 20_i64),
        ]);
        let mut it = Comparison::new(
            store.clone(),
            store.nodes_all_iterator(),
            Operator::Gte,
            Value::Int(110),
        );
        assert_eq!(
            iterated_values(&store, &mut it),
            vec![Value::Int(110), Value::Int(112)]
        );
        assert!(it.err().is_none());
    }

    #[test]
    fn test_contains_rejects_without_asking_sub() {
        let store = store_with(&[Quad::triple("a", "n", 20_i64)]);
        let ctx = Context::background();
        let twenty = store.value_of(&Value::Int(20)).unwrap();
        let a = store.value_of(&Value::string("a")).unwrap();
        let mut it = Comparison::new(
            store.clone(),
            store.nodes_all_iterator(),
            Operator::Lte,
            Value::Int(20),
        );
        assert!(it.contains(&ctx, twenty));
        assert!(!it.contains(&ctx, a));
        assert!(it.err().is_none());
    }
}
