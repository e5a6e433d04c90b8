// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Predicate evaluation adapters

mod expr;
mod noop;

pub use expr::ExprEvaluator;
pub use noop::NoOpEvaluator;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{EvalCall, FakeEvaluator};

use sluice_core::CloudEvent;
use thiserror::Error;

/// Errors from predicate evaluation.
///
/// Callers treat the two variants differently: a compile error means the
/// expression itself is broken and will never match anything, while an
/// evaluation error is specific to one event and is handled as a non-match.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("expression failed to compile: {0}")]
    Compile(String),
    #[error("expression failed to evaluate: {0}")]
    Eval(String),
}

impl EvaluatorError {
    pub fn is_compile(&self) -> bool {
        matches!(self, EvaluatorError::Compile(_))
    }
}

/// Adapter for evaluating rule and subscription predicates against events.
///
/// Evaluation must be side-effect-free and bounded; implementations never
/// see the store, only the one event under test.
pub trait Evaluator: Clone + Send + Sync + 'static {
    fn evaluate(&self, expression: &str, event: &CloudEvent) -> Result<bool, EvaluatorError>;
}
