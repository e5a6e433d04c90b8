// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural validation of incoming envelopes

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attributes;
use crate::event::CloudEvent;

/// One attribute-level problem found during structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub attribute: String,
    pub problem: String,
}

impl Violation {
    pub fn new(attribute: impl Into<String>, problem: impl Into<String>) -> Self {
        Self { attribute: attribute.into(), problem: problem.into() }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.attribute, self.problem)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("event failed structural validation: {}", describe(violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

fn describe(violations: &[Violation]) -> String {
    violations.iter().map(Violation::to_string).collect::<Vec<_>>().join("; ")
}

/// Checks the envelope against the CloudEvents 1.0 structural rules.
/// Collects every violation rather than stopping at the first so the
/// producer sees the whole repair list in one round trip.
pub fn validate(event: &CloudEvent) -> Result<(), ValidationError> {
    let mut violations = Vec::new();

    if event.id.is_empty() {
        violations.push(Violation::new(attributes::ATTR_ID, "must not be empty"));
    }
    if !attributes::is_valid_uri_ref(&event.source) {
        violations.push(Violation::new(
            attributes::ATTR_SOURCE,
            "must be a non-empty URI reference without whitespace",
        ));
    }
    if event.specversion != attributes::SPEC_VERSION {
        violations.push(Violation::new(
            attributes::ATTR_SPEC_VERSION,
            format!("unsupported version {:?}, expected {:?}", event.specversion, attributes::SPEC_VERSION),
        ));
    }
    if event.event_type.is_empty() {
        violations.push(Violation::new(attributes::ATTR_TYPE, "must not be empty"));
    }
    if let Some(schema) = &event.dataschema {
        if !attributes::is_valid_uri_ref(schema) {
            violations.push(Violation::new(
                attributes::ATTR_DATA_SCHEMA,
                "must be a non-empty URI reference without whitespace",
            ));
        }
    }
    for (name, value) in &event.extensions {
        if !attributes::is_valid_extension_name(name) {
            violations.push(Violation::new(name.clone(), "illegal extension attribute name"));
        }
        if !is_scalar(value) {
            violations.push(Violation::new(name.clone(), "extension values must be scalar"));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Bool(_) | Value::Number(_))
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
