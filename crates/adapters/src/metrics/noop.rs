// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op metrics sink.

use super::MetricsSink;

/// Metrics sink that drops every increment.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpMetrics;

impl NoOpMetrics {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsSink for NoOpMetrics {
    fn increment_ingested(&self) {}
    fn increment_rejected(&self) {}
    fn increment_invalid(&self) {}
    fn increment_published(&self, _partition: &str, _subscriber: &str) {}
    fn increment_delivery_failure(&self, _partition: &str, _subscriber: &str) {}
}
