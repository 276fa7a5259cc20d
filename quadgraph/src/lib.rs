// Forbid unwrap() in library code so corrupt state surfaces as an error.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

// Life of a query:
// 1. A `Shape` describes what to compute
// 2. `shape::optimize` applies the generic rules, then the store's hook
// 3. `shape::build_iterator` compiles it into an iterator tree
// 4. The caller drives the tree with `next` / `contains` / `next_path`
//
// Life of a mutation:
// 1. `Writer` turns a call into one batch of `Delta`s
// 2. The store validates the whole batch, then applies it
// 3. Value reference counts drop; released values are reclaimed now, on a
//    later GC tick, or never, depending on the store's `NodeGc`

pub mod config;
pub mod error;
pub mod iterator;
pub mod shape;
pub mod store;
pub mod types;
pub mod writer;

mod conformance;
#[cfg(test)]
mod testing;

pub use error::GraphError;
pub use iterator::{BoxIterator, Context, GraphIterator, RefKind};
pub use shape::Shape;
pub use store::{Capabilities, Delta, MemStore, MemStoreOptions, QuadStore, StoreRef};
pub use types::{Direction, Quad, Ref, Value};
pub use writer::{Writer, WriterOptions};
