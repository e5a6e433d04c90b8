// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake schema registry for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{EventSchema, SchemaRegistry, SchemaRegistryError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Recorded schema lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCall {
    pub event_type: String,
    pub dataschema: Option<String>,
}

#[derive(Default)]
struct FakeRegistryState {
    schemas: HashMap<String, EventSchema>,
    unavailable: Option<String>,
    calls: Vec<SchemaCall>,
}

/// Fake schema registry for testing
#[derive(Clone, Default)]
pub struct FakeSchemaRegistry {
    state: Arc<Mutex<FakeRegistryState>>,
}

impl FakeSchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canned schema for an event type.
    pub fn insert(&self, event_type: &str, schema: EventSchema) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .schemas
            .insert(event_type.to_string(), schema);
    }

    /// Make every subsequent lookup fail with `Unavailable`.
    pub fn set_unavailable(&self, detail: &str) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).unavailable =
            Some(detail.to_string());
    }

    /// Restore normal lookups after `set_unavailable`.
    pub fn set_available(&self) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).unavailable = None;
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<SchemaCall> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).calls.clone()
    }
}

#[async_trait]
impl SchemaRegistry for FakeSchemaRegistry {
    async fn fetch_schema(
        &self,
        event_type: &str,
        dataschema: Option<&str>,
    ) -> Result<Option<EventSchema>, SchemaRegistryError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(SchemaCall {
            event_type: event_type.to_string(),
            dataschema: dataschema.map(str::to_string),
        });

        if let Some(detail) = &state.unavailable {
            return Err(SchemaRegistryError::Unavailable(detail.clone()));
        }
        Ok(state.schemas.get(event_type).cloned())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
