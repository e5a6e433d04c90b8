// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The four-stage admission pipeline.

use crate::outcome::{AdmissionDecision, AdmissionOutcome};
use sluice_adapters::{Evaluator, MetricsSink, SchemaRegistry, SchemaRegistryError};
use sluice_core::config::AdmissionRule;
use sluice_core::{validate, Clock, CloudEvent};

/// Admission control over one event at a time.
///
/// Stages run in order and short-circuit: structural validation, schema
/// validation, authorization, enrichment. Extension names are canonicalized
/// to lowercase before any stage sees them; enrichment stamps `time` when
/// the producer left it out and changes nothing else.
///
/// Refused events increment `invalid` (stage 1 and 2) or `rejected`
/// (stage 3). A registry outage increments neither, the event was never
/// judged. The `ingested` counter belongs to the caller, after the append
/// it performs with the admitted envelope.
pub struct AdmissionPipeline<R, E, C, M> {
    registry: R,
    evaluator: E,
    clock: C,
    metrics: M,
    rules: Vec<AdmissionRule>,
}

impl<R, E, C, M> AdmissionPipeline<R, E, C, M>
where
    R: SchemaRegistry,
    E: Evaluator,
    C: Clock,
    M: MetricsSink,
{
    pub fn new(registry: R, evaluator: E, clock: C, metrics: M) -> Self {
        Self { registry, evaluator, clock, metrics, rules: Vec::new() }
    }

    /// Authorization rules, checked in order after validation.
    pub fn with_rules(mut self, rules: Vec<AdmissionRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Run one event through every stage.
    pub async fn evaluate(&self, event: CloudEvent) -> AdmissionDecision {
        let event = event.normalized();

        if let Err(error) = validate(&event) {
            self.metrics.increment_invalid();
            tracing::debug!(event_id = %event.id, %error, "structural validation failed");
            return Err(AdmissionOutcome::ValidationFailed { violations: error.violations });
        }

        match self
            .registry
            .fetch_schema(&event.event_type, event.dataschema.as_deref())
            .await
        {
            Ok(None) => {}
            Ok(Some(schema)) => {
                let violations = schema.check(event.data.as_ref());
                if !violations.is_empty() {
                    self.metrics.increment_invalid();
                    tracing::debug!(
                        event_id = %event.id,
                        event_type = %event.event_type,
                        violations = violations.len(),
                        "payload failed its schema"
                    );
                    return Err(AdmissionOutcome::ValidationFailed { violations });
                }
            }
            Err(SchemaRegistryError::Unavailable(detail)) => {
                tracing::warn!(event_id = %event.id, %detail, "schema registry unavailable");
                return Err(AdmissionOutcome::SchemaUnavailable { detail });
            }
        }

        for rule in &self.rules {
            // An expression that cannot be evaluated admits nobody.
            let admitted = match self.evaluator.evaluate(&rule.expression, &event) {
                Ok(verdict) => verdict,
                Err(error) => {
                    tracing::warn!(rule = %rule.name, %error, "authorization rule failed to evaluate");
                    false
                }
            };
            if !admitted {
                self.metrics.increment_rejected();
                tracing::debug!(event_id = %event.id, rule = %rule.name, "authorization denied");
                return Err(AdmissionOutcome::Rejected { rule: rule.name.clone() });
            }
        }

        let mut event = event;
        if event.time.is_none() {
            event.time = Some(self.clock.now());
        }
        Ok(event)
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
