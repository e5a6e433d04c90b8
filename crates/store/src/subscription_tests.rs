use crate::memory::MemoryEventStore;
use crate::store::EventStore;
use sluice_core::{CloudEvent, PartitionReference, SequencingConfig};
use std::time::Duration;

fn event(id: &str, source: &str) -> CloudEvent {
    CloudEvent::new(id, source, "t")
}

#[tokio::test]
async fn catches_up_then_tails() {
    let store = MemoryEventStore::new();
    store.append(event("a", "s")).await.unwrap();
    store.append(event("b", "s")).await.unwrap();

    let mut subscription = store.subscribe(Some(1));
    assert_eq!(subscription.next().await.unwrap().sequence, 1);
    assert_eq!(subscription.next().await.unwrap().sequence, 2);

    // caught up: a live append wakes the pending next()
    let store2 = store.clone();
    let waiter = tokio::spawn(async move {
        let mut live = store2.subscribe(Some(3));
        live.next().await.map(|r| r.sequence)
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    store.append(event("c", "s")).await.unwrap();
    assert_eq!(waiter.await.unwrap(), Some(3));
}

#[tokio::test]
async fn from_none_skips_history() {
    let store = MemoryEventStore::new();
    store.append(event("a", "s")).await.unwrap();
    let mut subscription = store.subscribe(None);
    store.append(event("b", "s")).await.unwrap();
    assert_eq!(subscription.next().await.unwrap().sequence, 2);
}

#[tokio::test]
async fn subscriptions_are_independently_cursored() {
    let store = MemoryEventStore::new();
    store.append(event("a", "s")).await.unwrap();
    store.append(event("b", "s")).await.unwrap();

    let mut one = store.subscribe(Some(1));
    let mut two = store.subscribe(Some(1));
    assert_eq!(one.next().await.unwrap().sequence, 1);
    assert_eq!(one.next().await.unwrap().sequence, 2);
    // the second cursor is unaffected by the first's consumption
    assert_eq!(two.next().await.unwrap().sequence, 1);
}

#[tokio::test]
async fn partition_scope_filters_the_tail() {
    let store = MemoryEventStore::new();
    let mut subscription =
        store.subscribe_partition(PartitionReference::by_source("src-a"), Some(1));

    store.append(event("1", "src-a")).await.unwrap();
    store.append(event("2", "src-b")).await.unwrap();
    store.append(event("3", "src-a")).await.unwrap();

    assert_eq!(subscription.next().await.unwrap().sequence, 1);
    assert_eq!(subscription.next().await.unwrap().sequence, 3);
}

#[tokio::test]
async fn unpopulated_partition_subscription_waits_for_first_member() {
    let store = MemoryEventStore::new();
    let mut subscription =
        store.subscribe_partition(PartitionReference::by_subject("order/9"), Some(1));

    store.append(event("a", "s")).await.unwrap();
    store.append(event("b", "s").with_subject("order/9")).await.unwrap();

    assert_eq!(subscription.next().await.unwrap().sequence, 2);
}

#[tokio::test]
async fn sequencing_projection_applies_to_subscription_reads() {
    let store = MemoryEventStore::with_sequencing(SequencingConfig::attribute("sequence"));
    store.append(event("a", "s")).await.unwrap();
    let mut subscription = store.subscribe(Some(1));
    let record = subscription.next().await.unwrap();
    assert_eq!(record.event.extension("sequence"), Some(&serde_json::json!(1)));
}

#[tokio::test]
async fn cursor_reports_last_seen_sequence() {
    let store = MemoryEventStore::new();
    store.append(event("a", "s")).await.unwrap();
    let mut subscription = store.subscribe(Some(1));
    assert_eq!(subscription.cursor(), 0);
    subscription.next().await.unwrap();
    assert_eq!(subscription.cursor(), 1);
}
