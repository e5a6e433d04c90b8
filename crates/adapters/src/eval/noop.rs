// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op evaluator for when predicates are disabled.

use super::{Evaluator, EvaluatorError};
use sluice_core::CloudEvent;

/// Evaluator that treats every expression as a match.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpEvaluator;

impl NoOpEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for NoOpEvaluator {
    fn evaluate(&self, _expression: &str, _event: &CloudEvent) -> Result<bool, EvaluatorError> {
        Ok(true)
    }
}
