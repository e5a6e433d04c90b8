// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-plane polling: turns a subscription source into broker changes

use std::collections::HashMap;

use sluice_adapters::{
    Evaluator, EventSink, MetricsSink, SubscriptionSource, SubscriptionSourceError,
};
use sluice_core::{Subscription, SubscriptionChange};
use sluice_store::EventStore;

use crate::dispatcher::Broker;

/// Polls a [`SubscriptionSource`] and feeds the delta since the previous
/// poll into [`Broker::apply`]: an upsert for each new or changed
/// document, a delete for each vanished one. The caller owns the cadence;
/// one call is one poll. A failed listing leaves the known set untouched,
/// so the next successful poll diffs against the last good one.
pub struct SubscriptionWatcher<Src> {
    source: Src,
    known: HashMap<String, Subscription>,
}

impl<Src: SubscriptionSource> SubscriptionWatcher<Src> {
    pub fn new(source: Src) -> Self {
        Self { source, known: HashMap::new() }
    }

    pub async fn poll<S, E, K, M>(
        &mut self,
        broker: &Broker<S, E, K, M>,
    ) -> Result<(), SubscriptionSourceError>
    where
        S: EventStore,
        E: Evaluator,
        K: EventSink,
        M: MetricsSink,
    {
        let listed = self.source.list().await?;
        for subscription in &listed {
            if self.known.get(&subscription.id) != Some(subscription) {
                broker.apply(SubscriptionChange::Upserted(subscription.clone())).await;
            }
        }
        for id in self.known.keys() {
            if !listed.iter().any(|subscription| subscription.id == *id) {
                broker.apply(SubscriptionChange::Deleted(id.clone())).await;
            }
        }
        self.known = listed.into_iter().map(|s| (s.id.clone(), s)).collect();
        Ok(())
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
