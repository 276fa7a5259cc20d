//! Test enumerating alternate bindings with `next_path`.

use std::collections::HashMap;

use crate::conformance::helpers::*;
use crate::iterator::{And, Context, Fixed, GraphIterator, HasA, LinksTo, Save};
use crate::types::{Direction, Value};

#[test]
fn test_next_path() {
    for_each_fixture_store(|h| {
        let ctx = Context::background();
        let follows_someone = And::new(vec![
            Box::new(LinksTo::new(
                h.store.clone(),
                Box::new(Fixed::new(vec![h.node("follows")])),
                Direction::Predicate,
            )),
            Box::new(LinksTo::new(
                h.store.clone(),
                Box::new(Save::new(h.store.nodes_all_iterator(), "all")),
                Direction::Object,
            )),
        ]);
        let mut it = And::new(vec![
            Box::new(Fixed::new(vec![h.node("C")])),
            Box::new(HasA::new(
                h.store.clone(),
                Box::new(follows_someone),
                Direction::Subject,
            )),
        ]);

        let mut results = Vec::new();
        let mut tagged = Vec::new();
        while it.next(&ctx) {
            results.push(it.result().unwrap());
            loop {
                let mut tags = HashMap::new();
                it.tag_results(&mut tags);
                tagged.push(h.store.name_of(tags["all"]).unwrap());
                if !it.next_path(&ctx) {
                    break;
                }
            }
        }
        assert!(it.err().is_none(), "[{}]", h.name);
        assert_eq!(results, vec![h.node("C")], "[{}]", h.name);

        tagged.sort_by_cached_key(ToString::to_string);
        assert_eq!(tagged, h.expected_values(vec![Value::string("B"), Value::string("D")]));
    });
}
