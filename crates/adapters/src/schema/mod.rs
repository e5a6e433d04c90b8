// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema registry adapters

mod catalog;
mod noop;

pub use catalog::{SchemaCatalogError, StaticSchemaRegistry};
pub use noop::NoOpSchemaRegistry;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSchemaRegistry, SchemaCall};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sluice_core::Violation;
use thiserror::Error;

/// Errors from schema lookups.
///
/// A missing schema is not an error: `fetch_schema` returns `Ok(None)` and
/// the event is admitted without payload checks. `Unavailable` means the
/// registry could not answer at all, which callers surface as a retriable
/// condition rather than a rejection.
#[derive(Debug, Error)]
pub enum SchemaRegistryError {
    #[error("schema registry unavailable: {0}")]
    Unavailable(String),
}

/// Adapter for schema lookup during admission
#[async_trait]
pub trait SchemaRegistry: Clone + Send + Sync + 'static {
    /// Fetch the schema registered for an event type, if any.
    ///
    /// `dataschema` is the producer's advisory schema reference; registries
    /// may use it to select among versions or ignore it entirely.
    async fn fetch_schema(
        &self,
        event_type: &str,
        dataschema: Option<&str>,
    ) -> Result<Option<EventSchema>, SchemaRegistryError>;
}

/// Expected JSON type of the payload root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Boolean,
}

impl SchemaType {
    fn matches(self, value: &Value) -> bool {
        match self {
            SchemaType::Object => value.is_object(),
            SchemaType::Array => value.is_array(),
            SchemaType::String => value.is_string(),
            SchemaType::Number => value.is_number(),
            SchemaType::Boolean => value.is_boolean(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Boolean => "boolean",
        }
    }
}

/// Payload constraints registered for one event type.
///
/// Deliberately a small subset of JSON Schema: a root type check plus
/// required property names. That is enough to distinguish a nonconforming
/// payload from a registry outage, which is the distinction admission
/// callers care about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct EventSchema {
    /// Expected JSON type of the payload root, if constrained.
    pub root: Option<SchemaType>,
    /// Property names that must be present when the root is an object.
    pub required: Vec<String>,
}

impl EventSchema {
    /// Check a payload against this schema, collecting every violation.
    ///
    /// An absent payload violates any schema that constrains the root or
    /// requires properties; an empty schema accepts anything.
    pub fn check(&self, data: Option<&Value>) -> Vec<Violation> {
        let mut violations = Vec::new();

        let Some(value) = data else {
            if self.root.is_some() || !self.required.is_empty() {
                violations.push(Violation::new("data", "payload is required by the schema"));
            }
            return violations;
        };

        if let Some(root) = self.root {
            if !root.matches(value) {
                violations.push(Violation::new(
                    "data",
                    format!("payload root must be {}", root.name()),
                ));
            }
        }

        if !self.required.is_empty() {
            match value.as_object() {
                Some(map) => {
                    for property in &self.required {
                        if !map.contains_key(property) {
                            violations.push(Violation::new(
                                format!("data.{property}"),
                                "required property is missing",
                            ));
                        }
                    }
                }
                None => {
                    if self.root.is_none() {
                        violations.push(Violation::new(
                            "data",
                            "payload root must be object to satisfy required properties",
                        ));
                    }
                }
            }
        }

        violations
    }
}
