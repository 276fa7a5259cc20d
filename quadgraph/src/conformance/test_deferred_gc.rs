//! Test deferred node reclamation by GC ticks and the background task.

use std::time::Duration;

use crate::conformance::helpers::*;
use crate::store::{MemStoreOptions, NodeGc};
use crate::testing::make_quad_set;
use crate::types::{Quad, Value};
use crate::writer::WriterOptions;

fn deferred() -> Harness {
    crate::testing::init_tracing();
    let h = Harness::new(
        "deferred",
        MemStoreOptions {
            node_gc: NodeGc::Deferred,
            ..MemStoreOptions::default()
        },
    );
    h.load(&make_quad_set());
    h
}

#[test]
fn test_released_value_waits_for_tick() {
    let h = deferred();
    let a = h.node("A");
    h.writer(WriterOptions::default())
        .remove_quad(Quad::triple("A", "follows", "B"))
        .unwrap();

    assert_eq!(h.mem.pending_gc().unwrap(), 1);
    assert_eq!(h.store.value_of(&Value::string("A")), Some(a));
    assert_eq!(h.store.name_of(a), Some(Value::string("A")));
    assert_eq!(h.store.size(), 10 + 11);

    let tick = h.mem.gc_tick(10).unwrap();
    assert_eq!(tick.nodes_reclaimed, 1);
    assert_eq!(tick.nodes_remaining, 0);
    assert_eq!(h.store.value_of(&Value::string("A")), None);
    assert_eq!(h.store.size(), 10 + 10);
}

#[test]
fn test_readded_value_is_not_reclaimed() {
    let h = deferred();
    let w = h.writer(WriterOptions::default());
    let ab = Quad::triple("A", "follows", "B");
    let a = h.node("A");
    w.remove_quad(ab.clone()).unwrap();
    w.add_quad(ab).unwrap();

    let tick = h.mem.gc_tick(10).unwrap();
    assert_eq!(tick.nodes_reclaimed, 0);
    assert_eq!(h.store.value_of(&Value::string("A")), Some(a));
}

#[test]
fn test_tick_respects_batch_size() {
    let h = deferred();
    h.writer(WriterOptions::default())
        .remove_node(&Value::string("D"))
        .unwrap();
    h.writer(WriterOptions::default())
        .remove_quad(Quad::triple("A", "follows", "B"))
        .unwrap();
    // D and A are released.
    assert_eq!(h.mem.pending_gc().unwrap(), 2);

    let first = h.mem.gc_tick(1).unwrap();
    assert_eq!((first.nodes_reclaimed, first.nodes_remaining), (1, 1));
    let second = h.mem.gc_tick(1).unwrap();
    assert_eq!((second.nodes_reclaimed, second.nodes_remaining), (1, 0));
}

#[tokio::test]
async fn test_background_task_reclaims() {
    let h = deferred();
    let handle = h.mem.start_gc().unwrap();
    h.writer(WriterOptions::default())
        .remove_node(&Value::string("D"))
        .unwrap();

    let drained = tokio::time::timeout(Duration::from_secs(1), async {
        while h.mem.pending_gc().unwrap() > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(drained.is_ok(), "GC task should drain released values");
    assert_eq!(h.store.value_of(&Value::string("D")), None);
    assert_eq!(h.store.size(), 7 + 10);

    let notify = h.mem.gc_notify_handle();
    drop(h);
    notify.notify_one();
    let stopped = tokio::time::timeout(Duration::from_secs(1), handle).await;
    assert!(stopped.is_ok(), "GC task should stop once the store is dropped");
}
