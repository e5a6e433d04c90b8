// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake subscription source for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{SubscriptionSource, SubscriptionSourceError};
use async_trait::async_trait;
use sluice_core::Subscription;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeSourceState {
    subscriptions: Vec<Subscription>,
    fail_next: Option<String>,
}

/// Fake subscription source serving an in-memory set mutated by tests.
#[derive(Clone, Default)]
pub struct FakeSubscriptionSource {
    state: Arc<Mutex<FakeSourceState>>,
}

impl FakeSubscriptionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole desired set.
    pub fn set(&self, subscriptions: Vec<Subscription>) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).subscriptions = subscriptions;
    }

    /// Add or replace one subscription by id.
    pub fn upsert(&self, subscription: Subscription) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.subscriptions.iter_mut().find(|s| s.id == subscription.id) {
            Some(existing) => *existing = subscription,
            None => state.subscriptions.push(subscription),
        }
    }

    /// Remove one subscription by id.
    pub fn remove(&self, id: &str) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .subscriptions
            .retain(|s| s.id != id);
    }

    /// Make the next `list` call fail.
    pub fn fail_next(&self, detail: &str) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_next =
            Some(detail.to_string());
    }
}

#[async_trait]
impl SubscriptionSource for FakeSubscriptionSource {
    async fn list(&self) -> Result<Vec<Subscription>, SubscriptionSourceError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(detail) = state.fail_next.take() {
            return Err(SubscriptionSourceError::Read {
                path: "fake".into(),
                source: std::io::Error::other(detail),
            });
        }
        Ok(state.subscriptions.clone())
    }
}
