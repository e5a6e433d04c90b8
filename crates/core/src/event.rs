// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CloudEvent envelope and its stored record form

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attributes;

/// The CloudEvents 1.0 envelope.
///
/// Context attributes are typed fields; everything else on the wire lands
/// in `extensions`. Extension names are case-insensitive and stored
/// lowercase; `set_extension` normalizes, and `normalized` repairs an
/// envelope deserialized from a producer that used mixed case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEvent {
    pub id: String,
    pub source: String,
    pub specversion: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datacontenttype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataschema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl CloudEvent {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            specversion: attributes::SPEC_VERSION.to_string(),
            event_type: event_type.into(),
            time: None,
            subject: None,
            datacontenttype: None,
            dataschema: None,
            data: None,
            extensions: BTreeMap::new(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_extension(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set_extension(name, value);
        self
    }

    /// Sets an extension attribute, normalizing the name to lowercase.
    pub fn set_extension(&mut self, name: &str, value: impl Into<Value>) {
        self.extensions.insert(attributes::normalize(name), value.into());
    }

    /// Looks up an extension attribute, case-insensitively.
    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(&attributes::normalize(name))
    }

    /// The string form of an extension attribute, used as a partition key.
    /// Scalars other than strings render via their JSON text.
    pub fn extension_text(&self, name: &str) -> Option<String> {
        self.extension(name).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn correlation_id(&self) -> Option<String> {
        self.extension_text(attributes::EXT_CORRELATION_ID)
    }

    pub fn causation_id(&self) -> Option<String> {
        self.extension_text(attributes::EXT_CAUSATION_ID)
    }

    /// Returns the envelope with extension names lowered. Context fields
    /// are bound by serde and already canonical.
    pub fn normalized(mut self) -> Self {
        if self.extensions.keys().all(|k| !k.chars().any(|c| c.is_ascii_uppercase())) {
            return self;
        }
        let mut lowered = BTreeMap::new();
        for (name, value) in std::mem::take(&mut self.extensions) {
            lowered.insert(attributes::normalize(&name), value);
        }
        self.extensions = lowered;
        self
    }
}

/// The stored form: an admitted envelope plus its store-assigned position
/// on the global stream. Created exactly once at append time and immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudEventRecord {
    pub sequence: u64,
    pub event: CloudEvent,
}

impl CloudEventRecord {
    pub fn new(sequence: u64, event: CloudEvent) -> Self {
        Self { sequence, event }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
