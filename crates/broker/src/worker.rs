// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-subscription tail task

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sluice_adapters::{Evaluator, EventSink, MetricsSink, SinkError};
use sluice_core::{CloudEventRecord, RetryPolicy, Subscription, SubscriptionPhase};
use sluice_store::EventStore;
use tokio::sync::watch;

/// Phase table shared between the broker and its workers. Workers flip
/// their own entry between `Active` and `Faulted`; the broker owns every
/// other transition.
pub(crate) type SharedStatuses = Arc<Mutex<HashMap<String, SubscriptionPhase>>>;

pub(crate) fn record_phase(statuses: &SharedStatuses, id: &str, phase: SubscriptionPhase) {
    let mut table = statuses.lock().unwrap_or_else(|e| e.into_inner());
    table.insert(id.to_string(), phase);
}

/// What became of one record, from the tail loop's point of view.
enum Flow {
    /// Delivered or filtered out; the cursor may advance past it.
    Processed,
    /// The task must stop and stay faulted; the record was not processed.
    Park,
    /// Cancelled mid-backoff; the record was not processed.
    Shutdown,
}

/// One subscription's tail: catch up, filter, deliver, retry.
///
/// `progress` is the at-least-once bookmark. It moves only after a record
/// is fully processed (delivered, or filtered out by the predicate), so a
/// reconcile that lands mid-retry respawns the task at the undelivered
/// record rather than past it.
pub(crate) struct Worker<S, E, K, M> {
    pub(crate) subscription: Subscription,
    pub(crate) store: S,
    pub(crate) evaluator: E,
    pub(crate) sink: K,
    pub(crate) metrics: M,
    pub(crate) statuses: SharedStatuses,
    pub(crate) progress: Arc<AtomicU64>,
    pub(crate) retry: RetryPolicy,
    pub(crate) delivery_timeout: Duration,
    pub(crate) shutdown: watch::Receiver<bool>,
    pub(crate) partition_label: String,
}

impl<S, E, K, M> Worker<S, E, K, M>
where
    S: EventStore,
    E: Evaluator,
    K: EventSink,
    M: MetricsSink,
{
    pub(crate) async fn run(mut self, from: Option<u64>) {
        let mut events = match self.subscription.filter.partition.clone() {
            Some(partition) => self.store.subscribe_partition(partition, from),
            None => self.store.subscribe(from),
        };
        self.progress.store(events.cursor(), Ordering::Relaxed);
        self.set_phase(SubscriptionPhase::Active);
        tracing::info!(
            subscription = %self.subscription.id,
            partition = %self.partition_label,
            cursor = events.cursor(),
            "subscription tail started"
        );
        loop {
            let record = tokio::select! {
                _ = self.shutdown.changed() => return,
                next = events.next() => match next {
                    Some(record) => record,
                    None => {
                        // The store side is gone; nothing more will arrive.
                        self.set_phase(SubscriptionPhase::Stopped);
                        return;
                    }
                },
            };
            match self.process(&record).await {
                Flow::Processed => self.progress.store(record.sequence, Ordering::Relaxed),
                Flow::Park | Flow::Shutdown => return,
            }
        }
    }

    async fn process(&mut self, record: &CloudEventRecord) -> Flow {
        if let Some(predicate) = self.subscription.filter.predicate.as_deref() {
            match self.evaluator.evaluate(predicate, &record.event) {
                Ok(true) => {}
                Ok(false) => return Flow::Processed,
                Err(error) if error.is_compile() => {
                    tracing::error!(
                        subscription = %self.subscription.id,
                        %error,
                        "predicate does not compile; subscription faulted"
                    );
                    self.set_phase(SubscriptionPhase::Faulted);
                    return Flow::Park;
                }
                Err(error) => {
                    tracing::warn!(
                        subscription = %self.subscription.id,
                        sequence = record.sequence,
                        %error,
                        "predicate evaluation failed; treating record as a non-match"
                    );
                    return Flow::Processed;
                }
            }
        }
        self.deliver(record).await
    }

    /// Delivers one matched record, retrying in place until it lands, the
    /// retry cap runs out, or the task is cancelled. Never skips ahead.
    async fn deliver(&mut self, record: &CloudEventRecord) -> Flow {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let outcome = match tokio::time::timeout(
                self.delivery_timeout,
                self.sink.deliver(&self.subscription.sink, &record.event),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(SinkError::Timeout { timeout: self.delivery_timeout }),
            };
            match outcome {
                Ok(()) => {
                    self.metrics
                        .increment_published(&self.partition_label, &self.subscription.id);
                    self.set_phase(SubscriptionPhase::Active);
                    tracing::debug!(
                        subscription = %self.subscription.id,
                        sequence = record.sequence,
                        attempt,
                        "record delivered"
                    );
                    return Flow::Processed;
                }
                Err(error) => {
                    self.metrics
                        .increment_delivery_failure(&self.partition_label, &self.subscription.id);
                    self.set_phase(SubscriptionPhase::Faulted);
                    tracing::warn!(
                        subscription = %self.subscription.id,
                        sequence = record.sequence,
                        attempt,
                        %error,
                        "delivery failed"
                    );
                    if self.retry.exhausted(attempt + 1) {
                        tracing::error!(
                            subscription = %self.subscription.id,
                            sequence = record.sequence,
                            attempts = attempt,
                            "delivery attempts exhausted; subscription parked as faulted"
                        );
                        return Flow::Park;
                    }
                    let delay = self.retry.delay_for(attempt);
                    tokio::select! {
                        _ = self.shutdown.changed() => return Flow::Shutdown,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    fn set_phase(&self, phase: SubscriptionPhase) {
        record_phase(&self.statuses, &self.subscription.id, phase);
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
