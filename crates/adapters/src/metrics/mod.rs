// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operational counter adapters

mod counter;
mod noop;

pub use counter::CounterMetrics;
pub use noop::NoOpMetrics;

use serde::{Deserialize, Serialize};

/// Adapter for the gateway's and dispatcher's operational counters.
///
/// Increments are synchronous and infallible so they can sit on hot paths
/// without an error branch. `partition` is the subscription's scope label:
/// the partition reference in its display form, or `"stream"` for
/// subscriptions over the whole stream.
pub trait MetricsSink: Clone + Send + Sync + 'static {
    /// An event passed admission and was appended.
    fn increment_ingested(&self);
    /// An event was denied by an authorization rule.
    fn increment_rejected(&self);
    /// An event failed structural or schema validation.
    fn increment_invalid(&self);
    /// An event was delivered to a subscriber.
    fn increment_published(&self, partition: &str, subscriber: &str);
    /// A delivery attempt to a subscriber failed.
    fn increment_delivery_failure(&self, partition: &str, subscriber: &str);
}

/// One labelled counter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledCount {
    pub partition: String,
    pub subscriber: String,
    pub count: u64,
}

/// Point-in-time reading of every counter, for the status surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub ingested: u64,
    pub rejected: u64,
    pub invalid: u64,
    pub published: Vec<LabelledCount>,
    pub delivery_failures: Vec<LabelledCount>,
}
