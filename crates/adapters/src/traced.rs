// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::sink::{EventSink, SinkError};
use async_trait::async_trait;
use sluice_core::CloudEvent;

/// Wrapper that adds tracing to any EventSink
#[derive(Clone)]
pub struct TracedSink<K> {
    inner: K,
}

impl<K> TracedSink<K> {
    pub fn new(inner: K) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<K: EventSink> EventSink for TracedSink<K> {
    async fn deliver(&self, sink: &str, event: &CloudEvent) -> Result<(), SinkError> {
        let span = tracing::info_span!("sink.deliver", sink, event_id = %event.id);
        let _guard = span.enter();

        tracing::debug!(event_type = %event.event_type, "delivering");

        let start = std::time::Instant::now();
        let result = self.inner.deliver(sink, event).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "delivered"),
            Err(e) => {
                tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, error = %e, "delivery failed")
            }
        }

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
