// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission verdicts.

use serde::{Deserialize, Serialize};
use sluice_core::{CloudEvent, Violation};
use thiserror::Error;

/// Verdict of the admission pipeline: the admitted envelope ready for
/// append, or the outcome explaining the refusal.
pub type AdmissionDecision = Result<CloudEvent, AdmissionOutcome>;

/// Why an event was not admitted.
///
/// Refusals are ordinary values with a transport-friendly shape: a status,
/// a stable problem code, and enough detail for the producer to repair the
/// event. `SchemaUnavailable` is the odd one out, it faults the gateway
/// rather than the event and asks the producer to retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum AdmissionOutcome {
    #[error("event failed validation: {}", describe(violations))]
    ValidationFailed { violations: Vec<Violation> },
    #[error("schema registry unavailable: {detail}")]
    SchemaUnavailable { detail: String },
    #[error("denied by authorization rule {rule:?}")]
    Rejected { rule: String },
}

fn describe(violations: &[Violation]) -> String {
    violations.iter().map(Violation::to_string).collect::<Vec<_>>().join("; ")
}

impl AdmissionOutcome {
    /// Status for the transport surface, HTTP-alike by convention.
    pub fn status(&self) -> u16 {
        match self {
            AdmissionOutcome::ValidationFailed { .. } => 400,
            AdmissionOutcome::SchemaUnavailable { .. } => 503,
            AdmissionOutcome::Rejected { .. } => 403,
        }
    }

    /// Stable problem code clients can switch on.
    pub fn code(&self) -> &'static str {
        match self {
            AdmissionOutcome::ValidationFailed { .. } => "validation-failed",
            AdmissionOutcome::SchemaUnavailable { .. } => "schema-unavailable",
            AdmissionOutcome::Rejected { .. } => "authorization-denied",
        }
    }

    /// Whether the producer should retry the same event unmodified.
    pub fn is_retriable(&self) -> bool {
        matches!(self, AdmissionOutcome::SchemaUnavailable { .. })
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
