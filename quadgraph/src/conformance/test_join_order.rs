//! Test that intersections do not depend on the order of their members.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::conformance::helpers::*;
use crate::iterator::{And, BoxIterator, Fixed, GraphIterator, LinksTo, optimize_tree};
use crate::types::{Direction, Quad, Value};
use crate::writer::WriterOptions;

const NODES: usize = 6;
const ROUNDS: usize = 40;

fn name(i: usize) -> String {
    format!("n{i}")
}

fn random_quads(rng: &mut StdRng) -> Vec<Quad> {
    (0..60)
        .map(|_| {
            Quad::triple(
                name(rng.random_range(0..NODES)),
                if rng.random_bool(0.5) { "p0" } else { "p1" },
                name(rng.random_range(0..NODES)),
            )
        })
        .collect()
}

#[test]
fn test_join_order() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let quads = random_quads(&mut rng);

    for_each_store(|h| {
        h.writer(WriterOptions {
            ignore_duplicate: true,
            ..WriterOptions::default()
        })
        .add_quad_set(quads.clone())
        .unwrap();
        let stored: HashSet<Quad> = quads.iter().cloned().collect();

        for _ in 0..ROUNDS {
            let subject = name(rng.random_range(0..NODES));
            let object = name(rng.random_range(0..NODES));
            let Some(s) = h.store.value_of(&Value::string(subject.as_str())) else {
                continue;
            };
            let Some(o) = h.store.value_of(&Value::string(object.as_str())) else {
                continue;
            };

            let expected: Vec<Quad> = stored
                .iter()
                .filter(|q| {
                    q.subject == Value::string(subject.as_str())
                        && q.object == Value::string(object.as_str())
                })
                .cloned()
                .collect();

            let mut members: Vec<BoxIterator> = vec![
                Box::new(LinksTo::new(
                    h.store.clone(),
                    Box::new(Fixed::new(vec![s])),
                    Direction::Subject,
                )),
                Box::new(LinksTo::new(
                    h.store.clone(),
                    Box::new(Fixed::new(vec![o])),
                    Direction::Object,
                )),
                h.store.quads_all_iterator(),
            ];
            members.shuffle(&mut rng);

            let mut plain = And::new(members);
            assert_eq!(
                h.quads(&mut plain),
                h.expected_quads(&expected),
                "[{}] {subject} -> {object}",
                h.name
            );

            plain.reset();
            let (mut optimized, _) = optimize_tree(h.store.as_ref(), Box::new(plain));
            assert_eq!(
                h.quads(optimized.as_mut()),
                h.expected_quads(&expected),
                "[{}] optimized {subject} -> {object}",
                h.name
            );
        }
    });
}
