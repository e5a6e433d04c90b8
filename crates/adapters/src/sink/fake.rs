// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake delivery sink for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{EventSink, SinkError};
use async_trait::async_trait;
use sluice_core::CloudEvent;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Recorded successful delivery
#[derive(Debug, Clone)]
pub struct SinkCall {
    pub sink: String,
    pub event: CloudEvent,
}

#[derive(Default)]
struct FakeSinkState {
    delivered: Vec<SinkCall>,
    fail_first: HashMap<String, u32>,
    attempts: HashMap<String, u32>,
}

/// Fake delivery sink for testing.
///
/// Deliveries succeed unless scripted; `fail_first(id, n)` makes the first
/// `n` attempts for that event id fail with a 500, after which deliveries
/// for it succeed. Attempt counts are kept per event id so tests can assert
/// on retry behavior.
#[derive(Clone, Default)]
pub struct FakeEventSink {
    state: Arc<Mutex<FakeSinkState>>,
}

impl FakeEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the first `n` delivery attempts for an event id to fail.
    pub fn fail_first(&self, event_id: &str, n: u32) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .fail_first
            .insert(event_id.to_string(), n);
    }

    /// Successful deliveries, in order.
    pub fn delivered(&self) -> Vec<SinkCall> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).delivered.clone()
    }

    /// Ids of successfully delivered events, in order.
    pub fn delivered_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .delivered
            .iter()
            .map(|call| call.event.id.clone())
            .collect()
    }

    /// How many delivery attempts an event id has seen.
    pub fn attempts(&self, event_id: &str) -> u32 {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .attempts
            .get(event_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl EventSink for FakeEventSink {
    async fn deliver(&self, sink: &str, event: &CloudEvent) -> Result<(), SinkError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let attempt = state.attempts.entry(event.id.clone()).or_insert(0);
        *attempt += 1;
        let attempt = *attempt;

        if let Some(&failures) = state.fail_first.get(&event.id) {
            if attempt <= failures {
                return Err(SinkError::Status { status: 500 });
            }
        }

        state.delivered.push(SinkCall { sink: sink.to_string(), event: event.clone() });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
