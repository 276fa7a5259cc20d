//! Shape rewrite rules.

use std::collections::HashSet;

use crate::iterator::RefKind;
use crate::shape::Shape;
use crate::store::QuadStore;
use crate::types::Ref;

/// Rewrite `shape` into an equivalent, cheaper shape.
///
/// Runs the generic rules bottom-up, then the store's `optimize_shape` hook.
/// When the hook changes something the generic rules run once more, so the
/// result is a fixed point: optimizing it again reports no change.
pub fn optimize(shape: Shape, store: &dyn QuadStore) -> (Shape, bool) {
    let (shape, generic) = shape.rewrite(&mut |s| simplify(s, store));
    let (shape, backend) = store.optimize_shape(shape);
    if !backend {
        return (shape, generic);
    }
    let (shape, _) = shape.rewrite(&mut |s| simplify(s, store));
    (shape, true)
}

/// Apply the generic rules to one node whose children are already simplified.
fn simplify(shape: Shape, store: &dyn QuadStore) -> (Shape, bool) {
    match shape {
        Shape::Fixed(refs) if refs.is_empty() => (Shape::Null, true),
        Shape::Lookup(values) => {
            let refs: Vec<Ref> = values.iter().filter_map(|v| store.value_of(v)).collect();
            if refs.is_empty() {
                (Shape::Null, true)
            } else {
                (Shape::Fixed(refs), true)
            }
        }
        Shape::Quads(filters) if filters.is_empty() => (Shape::AllQuads, true),
        Shape::Quads(filters) if filters.iter().any(|f| *f.values == Shape::Null) => {
            (Shape::Null, true)
        }
        Shape::NodesFrom { quads, .. } if *quads == Shape::Null => (Shape::Null, true),
        Shape::Compare { from, .. } if *from == Shape::Null => (Shape::Null, true),
        Shape::Save { from, .. } if *from == Shape::Null => (Shape::Null, true),
        Shape::Intersect(members) => simplify_intersect(members),
        other => (other, false),
    }
}

/// The kind of ref every result of `shape` has, when it is known.
fn result_kind(shape: &Shape) -> Option<RefKind> {
    match shape {
        Shape::Null => None,
        Shape::AllNodes
        | Shape::Lookup(_)
        | Shape::NodesFrom { .. }
        | Shape::Compare { .. } => Some(RefKind::Node),
        Shape::AllQuads | Shape::Quads(_) => Some(RefKind::Quad),
        Shape::Fixed(refs) => RefKind::common(refs.iter().copied()),
        Shape::Intersect(members) => members.iter().find_map(result_kind),
        Shape::Save { from, .. } => result_kind(from),
    }
}

fn simplify_intersect(members: Vec<Shape>) -> (Shape, bool) {
    let mut changed = false;

    let mut flat = Vec::with_capacity(members.len());
    for member in members {
        if let Shape::Intersect(inner) = member {
            flat.extend(inner);
            changed = true;
        } else {
            flat.push(member);
        }
    }

    if flat.is_empty() || flat.contains(&Shape::Null) {
        return (Shape::Null, true);
    }

    let kinds: Vec<Option<RefKind>> = flat.iter().map(result_kind).collect();
    if kinds.contains(&Some(RefKind::Node)) && kinds.contains(&Some(RefKind::Quad)) {
        return (Shape::Null, true);
    }

    let mut others = flat.iter().filter(|m| **m != Shape::AllNodes).peekable();
    let pinned =
        others.peek().is_some() && others.all(|m| result_kind(m) == Some(RefKind::Node));
    if pinned && flat.contains(&Shape::AllNodes) {
        flat.retain(|m| *m != Shape::AllNodes);
        changed = true;
    }

    let fixed_count = flat.iter().filter(|m| matches!(m, Shape::Fixed(_))).count();
    if fixed_count > 1 {
        let mut merged: Option<Vec<Ref>> = None;
        let mut rest = Vec::with_capacity(flat.len());
        let mut fixed_at = 0;
        for member in flat {
            match member {
                Shape::Fixed(refs) => {
                    merged = Some(match merged {
                        None => {
                            fixed_at = rest.len();
                            refs
                        }
                        Some(acc) => {
                            let keep: HashSet<Ref> = refs.into_iter().collect();
                            acc.into_iter().filter(|r| keep.contains(r)).collect()
                        }
                    });
                }
                other => rest.push(other),
            }
        }
        let merged = merged.unwrap_or_default();
        if merged.is_empty() {
            return (Shape::Null, true);
        }
        rest.insert(fixed_at, Shape::Fixed(merged));
        flat = rest;
        changed = true;
    }

    if flat.len() == 1 {
        if let Some(only) = flat.pop() {
            return (only, true);
        }
    }
    (Shape::Intersect(flat), changed)
}
