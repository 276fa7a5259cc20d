//! Test projecting quads onto one of their directions.

use crate::conformance::helpers::*;
use crate::iterator::{Fixed, HasA, LinksTo};
use crate::types::Direction;

#[test]
fn test_followers_of_b() {
    for_each_fixture_store(|h| {
        let mut it = HasA::new(
            h.store.clone(),
            Box::new(LinksTo::new(
                h.store.clone(),
                Box::new(Fixed::new(vec![h.node("B")])),
                Direction::Object,
            )),
            Direction::Subject,
        );
        assert_eq!(
            h.values(&mut it),
            h.expected_values(strings(&["A", "C", "D"])),
            "[{}]",
            h.name
        );
    });
}

#[test]
fn test_status_holders() {
    for_each_fixture_store(|h| {
        let mut it = HasA::new(
            h.store.clone(),
            h.store.quad_iterator(Direction::Label, h.node("status_graph")),
            Direction::Subject,
        );
        assert_eq!(
            h.values(&mut it),
            h.expected_values(strings(&["B", "D", "G"])),
            "[{}]",
            h.name
        );
    });
}
