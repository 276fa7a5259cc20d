//! Compiling shapes into iterator trees.

use std::sync::Arc;

use crate::iterator::{And, BoxIterator, Comparison, Fixed, HasA, LinksTo, Null, Save};
use crate::shape::{QuadFilter, Shape};
use crate::store::StoreRef;

/// Compile a shape into an executable iterator tree over `store`.
#[must_use]
pub fn build_iterator(store: &StoreRef, shape: &Shape) -> BoxIterator {
    match shape {
        Shape::Null => Null::boxed(),
        Shape::AllNodes => store.nodes_all_iterator(),
        Shape::AllQuads => store.quads_all_iterator(),
        Shape::Fixed(refs) => Box::new(Fixed::new(refs.clone())),
        Shape::Lookup(values) => Box::new(Fixed::new(
            values.iter().filter_map(|v| store.value_of(v)).collect(),
        )),
        Shape::Quads(filters) => build_quads(store, filters),
        Shape::NodesFrom { dir, quads } => Box::new(HasA::new(
            Arc::clone(store),
            build_iterator(store, quads),
            *dir,
        )),
        Shape::Intersect(members) => {
            if members.is_empty() {
                return Null::boxed();
            }
            Box::new(And::new(
                members.iter().map(|m| build_iterator(store, m)).collect(),
            ))
        }
        Shape::Compare { from, op, value } => Box::new(Comparison::new(
            Arc::clone(store),
            build_iterator(store, from),
            *op,
            value.clone(),
        )),
        Shape::Save { tag, from } => Box::new(Save::new(build_iterator(store, from), tag.clone())),
    }
}

fn build_quads(store: &StoreRef, filters: &[QuadFilter]) -> BoxIterator {
    let mut links: Vec<BoxIterator> = filters
        .iter()
        .map(|filter| -> BoxIterator {
            Box::new(LinksTo::new(
                Arc::clone(store),
                build_iterator(store, &filter.values),
                filter.dir,
            ))
        })
        .collect();
    match links.len() {
        0 => store.quads_all_iterator(),
        1 => links.pop().map_or_else(Null::boxed, |only| only),
        _ => Box::new(And::new(links)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator::{IteratorType, Operator};
    use crate::shape::optimize;
    use crate::testing::{fixture_store, iterated_quads, iterated_strings, node};
    use crate::types::{Direction, Quad, Value};

    #[test]
    fn test_quads_by_subject_and_object() {
        let store = fixture_store();
        let shape = Shape::Quads(vec![
            QuadFilter::new(Direction::Subject, Shape::Lookup(vec![Value::string("B")])),
            QuadFilter::new(Direction::Object, Shape::Lookup(vec![Value::string("F")])),
        ]);
        let mut it = build_iterator(&store, &shape);
        assert_eq!(it.iterator_type(), IteratorType::And);
        assert_eq!(
            iterated_quads(&store, it.as_mut()),
            vec![Quad::triple("B", "follows", "F")]
        );
    }

    #[test]
    fn test_optimized_shape_yields_same_results() {
        let store = fixture_store();
        let shape = Shape::Intersect(vec![
            Shape::AllNodes,
            Shape::nodes_from(
                Direction::Object,
                Shape::Quads(vec![QuadFilter::new(
                    Direction::Subject,
                    Shape::Fixed(vec![node(&store, "C")]),
                )]),
            ),
            Shape::compare(Shape::AllNodes, Operator::Gt, Value::string("B")),
        ]);
        let (optimized, changed) = optimize(shape.clone(), store.as_ref());
        assert!(changed);

        let mut original = build_iterator(&store, &shape);
        let mut rewritten = build_iterator(&store, &optimized);
        assert_eq!(iterated_strings(&store, original.as_mut()), vec!["D"]);
        assert_eq!(iterated_strings(&store, rewritten.as_mut()), vec!["D"]);
    }

    #[test]
    fn test_empty_intersect_builds_null() {
        let store = fixture_store();
        let it = build_iterator(&store, &Shape::Intersect(Vec::new()));
        assert_eq!(it.iterator_type(), IteratorType::Null);
    }
}
