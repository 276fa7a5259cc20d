//! Store conformance suite.
//!
//! Every scenario runs against a `MemStore` in each supported configuration
//! and branches on the declared `Capabilities` instead of assuming one
//! behaviour. Each file covers one scenario over the shared fixture graph.

#![cfg(test)]

mod helpers;

mod test_add_remove;
mod test_cancellation;
mod test_compare_typed_values;
mod test_deferred_gc;
mod test_delete_quad;
mod test_deleted_from_iterator;
mod test_hasa;
mod test_iterator;
mod test_join_order;
mod test_load_one_quad;
mod test_load_typed_quads;
mod test_next_path;
mod test_node_delete;
mod test_set_iterator;
mod test_shape_optimize;
mod test_sizes;
