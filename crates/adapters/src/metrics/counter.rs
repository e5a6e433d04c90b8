// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process counters.

use super::{LabelledCount, MetricsSink, MetricsSnapshot};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

type LabelledMap = BTreeMap<(String, String), u64>;

/// Counters held in process memory, shared across clones.
///
/// The unlabelled counters are atomics; the labelled ones live behind a
/// mutex keyed by `(partition, subscriber)`. Snapshots list labelled
/// counters in key order, so the status surface is stable across calls.
#[derive(Clone, Default)]
pub struct CounterMetrics {
    ingested: Arc<AtomicU64>,
    rejected: Arc<AtomicU64>,
    invalid: Arc<AtomicU64>,
    published: Arc<Mutex<LabelledMap>>,
    delivery_failures: Arc<Mutex<LabelledMap>>,
}

impl CounterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every counter at once.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ingested: self.ingested.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            invalid: self.invalid.load(Ordering::Relaxed),
            published: collect(&self.published),
            delivery_failures: collect(&self.delivery_failures),
        }
    }
}

fn bump(map: &Mutex<LabelledMap>, partition: &str, subscriber: &str) {
    let mut map = map.lock().unwrap_or_else(|e| e.into_inner());
    *map.entry((partition.to_string(), subscriber.to_string())).or_insert(0) += 1;
}

fn collect(map: &Mutex<LabelledMap>) -> Vec<LabelledCount> {
    map.lock()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .map(|((partition, subscriber), count)| LabelledCount {
            partition: partition.clone(),
            subscriber: subscriber.clone(),
            count: *count,
        })
        .collect()
}

impl MetricsSink for CounterMetrics {
    fn increment_ingested(&self) {
        self.ingested.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_invalid(&self) {
        self.invalid.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_published(&self, partition: &str, subscriber: &str) {
        bump(&self.published, partition, subscriber);
    }

    fn increment_delivery_failure(&self, partition: &str, subscriber: &str) {
        bump(&self.delivery_failures, partition, subscriber);
    }
}

#[cfg(test)]
#[path = "counter_tests.rs"]
mod tests;
