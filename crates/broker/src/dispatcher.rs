// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription lifecycle owner: one tail task per active subscription

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use sluice_adapters::{Evaluator, EventSink, MetricsSink};
use sluice_core::{
    BrokerConfig, DesiredState, StartPosition, Subscription, SubscriptionChange, SubscriptionPhase,
};
use sluice_store::EventStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::worker::{record_phase, SharedStatuses, Worker};

/// External collaborators the broker dispatches through.
pub struct BrokerDeps<S, E, K, M> {
    pub store: S,
    pub evaluator: E,
    pub sink: K,
    pub metrics: M,
}

/// A running (or parked) subscription task and what it left behind.
struct SubscriptionHandle {
    spec: Subscription,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    progress: Arc<AtomicU64>,
}

/// Dispatches store records to subscription sinks.
///
/// [`apply`](Broker::apply) is the single entry point for control-plane
/// changes. An upsert of an unchanged spec is a no-op; a changed spec
/// stops the old task and respawns it at the first unprocessed sequence;
/// suspension and deletion stop the task and close its cursor. The phase
/// table outlives the tasks, so `statuses` still reports suspended and
/// stopped subscriptions.
pub struct Broker<S, E, K, M> {
    deps: BrokerDeps<S, E, K, M>,
    config: BrokerConfig,
    registry: tokio::sync::Mutex<HashMap<String, SubscriptionHandle>>,
    statuses: SharedStatuses,
}

impl<S, E, K, M> Broker<S, E, K, M>
where
    S: EventStore,
    E: Evaluator,
    K: EventSink,
    M: MetricsSink,
{
    pub fn new(deps: BrokerDeps<S, E, K, M>, config: BrokerConfig) -> Self {
        Self {
            deps,
            config,
            registry: tokio::sync::Mutex::new(HashMap::new()),
            statuses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Applies one control-plane change, reconciling the task set to it.
    pub async fn apply(&self, change: SubscriptionChange) {
        match change {
            SubscriptionChange::Upserted(spec) => self.upsert(spec).await,
            SubscriptionChange::Deleted(id) => self.delete(&id).await,
        }
    }

    async fn upsert(&self, spec: Subscription) {
        let mut registry = self.registry.lock().await;
        let resume = match registry.remove(&spec.id) {
            Some(handle) if handle.spec == spec => {
                registry.insert(spec.id.clone(), handle);
                return;
            }
            Some(handle) => {
                self.set_phase(&spec.id, SubscriptionPhase::Reconciling);
                tracing::info!(subscription = %spec.id, "subscription changed; reconciling");
                Some(stop_task(handle).await)
            }
            None => None,
        };
        if spec.desired_state == DesiredState::Suspended {
            self.set_phase(&spec.id, SubscriptionPhase::Suspended);
            tracing::info!(subscription = %spec.id, "subscription suspended");
            return;
        }
        // A resumed task picks up at the first sequence the old one never
        // processed; a fresh one starts where the config says to.
        let from = match resume {
            Some(processed) => Some(processed + 1),
            None => match self.config.start_position {
                StartPosition::End => None,
                StartPosition::Start => Some(1),
                StartPosition::Sequence(sequence) => Some(sequence),
            },
        };
        self.spawn(&mut registry, spec, from);
    }

    async fn delete(&self, id: &str) {
        let mut registry = self.registry.lock().await;
        let handle = registry.remove(id);
        let known = handle.is_some() || self.phase_of(id).is_some();
        if let Some(handle) = handle {
            stop_task(handle).await;
        }
        if known {
            self.set_phase(id, SubscriptionPhase::Stopped);
            tracing::info!(subscription = id, "subscription deleted");
        }
    }

    fn spawn(
        &self,
        registry: &mut HashMap<String, SubscriptionHandle>,
        spec: Subscription,
        from: Option<u64>,
    ) {
        self.set_phase(&spec.id, SubscriptionPhase::Starting);
        let partition_label = spec
            .filter
            .partition
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "stream".to_string());
        tracing::info!(
            subscription = %spec.id,
            partition = %partition_label,
            from = from.unwrap_or(0),
            "starting subscription"
        );
        let (shutdown, receiver) = watch::channel(false);
        let progress = Arc::new(AtomicU64::new(0));
        let worker = Worker {
            subscription: spec.clone(),
            store: self.deps.store.clone(),
            evaluator: self.deps.evaluator.clone(),
            sink: self.deps.sink.clone(),
            metrics: self.deps.metrics.clone(),
            statuses: Arc::clone(&self.statuses),
            progress: Arc::clone(&progress),
            retry: self.config.retry.clone(),
            delivery_timeout: self.config.delivery_timeout,
            shutdown: receiver,
            partition_label,
        };
        let task = tokio::spawn(worker.run(from));
        registry.insert(spec.id.clone(), SubscriptionHandle { spec, shutdown, task, progress });
    }

    /// Phase of every subscription the broker has seen, sorted by id.
    pub fn statuses(&self) -> Vec<(String, SubscriptionPhase)> {
        let table = self.statuses.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries: Vec<_> = table.iter().map(|(id, phase)| (id.clone(), *phase)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Stops every task, waiting for each to wind down its in-flight
    /// delivery attempt.
    pub async fn shutdown(&self) {
        let mut registry = self.registry.lock().await;
        for handle in registry.values() {
            let _ = handle.shutdown.send(true);
        }
        for (id, handle) in registry.drain() {
            stop_task(handle).await;
            self.set_phase(&id, SubscriptionPhase::Stopped);
        }
        tracing::info!("broker stopped");
    }

    fn set_phase(&self, id: &str, phase: SubscriptionPhase) {
        record_phase(&self.statuses, id, phase);
    }

    fn phase_of(&self, id: &str) -> Option<SubscriptionPhase> {
        let table = self.statuses.lock().unwrap_or_else(|e| e.into_inner());
        table.get(id).copied()
    }
}

/// Signals one task to stop, waits it out, and reports the last sequence
/// it fully processed.
async fn stop_task(handle: SubscriptionHandle) -> u64 {
    let SubscriptionHandle { spec, shutdown, task, progress } = handle;
    // A parked task has already dropped its receiver; nothing to signal.
    let _ = shutdown.send(true);
    if task.await.is_err() {
        tracing::warn!(subscription = %spec.id, "subscription task panicked during shutdown");
    }
    progress.load(Ordering::Relaxed)
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
