// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use sluice_adapters::{CounterMetrics, FakeEventSink, FakeSubscriptionSource, NoOpEvaluator};
use sluice_core::{BrokerConfig, CloudEvent, StartPosition, SubscriptionPhase};
use sluice_store::{EventStore, MemoryEventStore};

use super::*;
use crate::dispatcher::BrokerDeps;

type TestBroker = Broker<MemoryEventStore, NoOpEvaluator, FakeEventSink, CounterMetrics>;

fn event(id: &str) -> CloudEvent {
    CloudEvent::new(id, "https://orders.example/emitters/web", "order.created")
}

fn broker_over(store: &MemoryEventStore, sink: &FakeEventSink) -> TestBroker {
    let deps = BrokerDeps {
        store: store.clone(),
        evaluator: NoOpEvaluator::new(),
        sink: sink.clone(),
        metrics: CounterMetrics::new(),
    };
    let config =
        BrokerConfig { start_position: StartPosition::Start, ..BrokerConfig::default() };
    Broker::new(deps, config)
}

fn phase_of(broker: &TestBroker, id: &str) -> Option<SubscriptionPhase> {
    broker.statuses().into_iter().find(|(sid, _)| sid == id).map(|(_, phase)| phase)
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

#[tokio::test]
async fn the_first_poll_surfaces_every_document() {
    let store = MemoryEventStore::new();
    let sink = FakeEventSink::new();
    let broker = broker_over(&store, &sink);
    let source = FakeSubscriptionSource::new();
    source.set(vec![
        Subscription::new("audit", "https://sink.test/audit"),
        Subscription::new("billing", "https://sink.test/billing"),
    ]);
    let mut watcher = SubscriptionWatcher::new(source);

    watcher.poll(&broker).await.unwrap();

    wait_until(|| {
        phase_of(&broker, "audit") == Some(SubscriptionPhase::Active)
            && phase_of(&broker, "billing") == Some(SubscriptionPhase::Active)
    })
    .await;
}

#[tokio::test]
async fn vanished_documents_stop_their_subscriptions() {
    let store = MemoryEventStore::new();
    let sink = FakeEventSink::new();
    let broker = broker_over(&store, &sink);
    let source = FakeSubscriptionSource::new();
    source.set(vec![
        Subscription::new("audit", "https://sink.test/audit"),
        Subscription::new("billing", "https://sink.test/billing"),
    ]);
    let mut watcher = SubscriptionWatcher::new(source.clone());
    watcher.poll(&broker).await.unwrap();
    wait_until(|| phase_of(&broker, "billing") == Some(SubscriptionPhase::Active)).await;

    source.remove("billing");
    watcher.poll(&broker).await.unwrap();

    assert_eq!(phase_of(&broker, "billing"), Some(SubscriptionPhase::Stopped));
    wait_until(|| phase_of(&broker, "audit") == Some(SubscriptionPhase::Active)).await;
}

#[tokio::test]
async fn changed_documents_reconcile_in_place() {
    let store = MemoryEventStore::new();
    store.append(event("evt-1")).await.unwrap();
    let sink = FakeEventSink::new();
    let broker = broker_over(&store, &sink);
    let source = FakeSubscriptionSource::new();
    source.set(vec![Subscription::new("audit", "https://sink.test/a")]);
    let mut watcher = SubscriptionWatcher::new(source.clone());
    watcher.poll(&broker).await.unwrap();
    wait_until(|| sink.delivered_ids().len() == 1).await;

    source.upsert(Subscription::new("audit", "https://sink.test/b"));
    watcher.poll(&broker).await.unwrap();
    store.append(event("evt-2")).await.unwrap();

    wait_until(|| sink.delivered_ids().len() == 2).await;
    assert_eq!(sink.delivered_ids(), vec!["evt-1", "evt-2"]);
    assert_eq!(sink.delivered()[1].sink, "https://sink.test/b");
}

#[tokio::test]
async fn a_failed_poll_preserves_the_known_set() {
    let store = MemoryEventStore::new();
    store.append(event("evt-1")).await.unwrap();
    let sink = FakeEventSink::new();
    let broker = broker_over(&store, &sink);
    let source = FakeSubscriptionSource::new();
    source.set(vec![Subscription::new("audit", "https://sink.test/audit")]);
    let mut watcher = SubscriptionWatcher::new(source.clone());
    watcher.poll(&broker).await.unwrap();
    wait_until(|| sink.delivered_ids().len() == 1).await;

    source.fail_next("listing lost");
    assert!(watcher.poll(&broker).await.is_err());
    assert_eq!(phase_of(&broker, "audit"), Some(SubscriptionPhase::Active));

    // The next good poll diffs against the last good set: no restart, so
    // nothing is replayed from the start position.
    watcher.poll(&broker).await.unwrap();
    store.append(event("evt-2")).await.unwrap();
    wait_until(|| sink.delivered_ids().len() == 2).await;
    assert_eq!(sink.delivered_ids(), vec!["evt-1", "evt-2"]);
}
