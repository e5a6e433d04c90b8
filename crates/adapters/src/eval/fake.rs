// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake evaluator for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Evaluator, EvaluatorError};
use sluice_core::CloudEvent;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Recorded evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalCall {
    pub expression: String,
    pub event_id: String,
}

#[derive(Clone)]
enum Verdict {
    Match,
    NoMatch,
    CompileError(String),
    EvalError(String),
}

#[derive(Default)]
struct FakeEvaluatorState {
    verdicts: HashMap<String, Verdict>,
    calls: Vec<EvalCall>,
}

/// Fake evaluator returning scripted verdicts per expression.
///
/// Unscripted expressions match, so tests only script the exceptions.
#[derive(Clone, Default)]
pub struct FakeEvaluator {
    state: Arc<Mutex<FakeEvaluatorState>>,
}

impl FakeEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script an expression to match.
    pub fn matches(&self, expression: &str) {
        self.script(expression, Verdict::Match);
    }

    /// Script an expression to never match.
    pub fn rejects(&self, expression: &str) {
        self.script(expression, Verdict::NoMatch);
    }

    /// Script an expression to fail compilation.
    pub fn compile_error(&self, expression: &str, detail: &str) {
        self.script(expression, Verdict::CompileError(detail.to_string()));
    }

    /// Script an expression to fail during evaluation.
    pub fn eval_error(&self, expression: &str, detail: &str) {
        self.script(expression, Verdict::EvalError(detail.to_string()));
    }

    fn script(&self, expression: &str, verdict: Verdict) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .verdicts
            .insert(expression.to_string(), verdict);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<EvalCall> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).calls.clone()
    }
}

impl Evaluator for FakeEvaluator {
    fn evaluate(&self, expression: &str, event: &CloudEvent) -> Result<bool, EvaluatorError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(EvalCall {
            expression: expression.to_string(),
            event_id: event.id.clone(),
        });

        match state.verdicts.get(expression) {
            None | Some(Verdict::Match) => Ok(true),
            Some(Verdict::NoMatch) => Ok(false),
            Some(Verdict::CompileError(detail)) => Err(EvaluatorError::Compile(detail.clone())),
            Some(Verdict::EvalError(detail)) => Err(EvaluatorError::Eval(detail.clone())),
        }
    }
}
