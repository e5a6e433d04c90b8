// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Jinja2-style expression evaluator for predicates.
//!
//! Predicates are minijinja expressions over a context exposing the event
//! under `event`, in its wire form: context attributes at the top level,
//! extensions flattened beside them, the payload under `event.data`.
//!
//! - Attribute match: `event.type == "order.created"`
//! - Extension match: `event.correlationid == "run-7"`
//! - Payload inspection: `event.data.amount > 100`
//! - Presence check: `event.subject` (undefined is falsy)
//!
//! The verdict is the minijinja truthiness of the result value.

use super::{Evaluator, EvaluatorError};
use minijinja::{context, Environment, Value};
use sluice_core::CloudEvent;

/// Evaluator compiling predicates with minijinja.
///
/// Undefined lookups are lenient: referencing an attribute the event does
/// not carry yields `undefined`, which compares unequal to everything and
/// is falsy. A predicate over an absent extension is a non-match, not an
/// error.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExprEvaluator;

impl ExprEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Check that an expression compiles without evaluating it.
    ///
    /// Used when a subscription is registered, so a broken predicate is
    /// caught before any event reaches it.
    pub fn compile_check(&self, expression: &str) -> Result<(), EvaluatorError> {
        let env = Environment::new();
        env.compile_expression(expression)
            .map(|_| ())
            .map_err(|e| EvaluatorError::Compile(e.to_string()))
    }
}

impl Evaluator for ExprEvaluator {
    fn evaluate(&self, expression: &str, event: &CloudEvent) -> Result<bool, EvaluatorError> {
        // minijinja uses {{ }}, {% %} syntax for templates; expressions are
        // compiled bare, so `event.type == "x"` works without braces.
        let env = Environment::new();
        let compiled = env
            .compile_expression(expression)
            .map_err(|e| EvaluatorError::Compile(e.to_string()))?;
        let result = compiled
            .eval(context! { event => Value::from_serialize(event) })
            .map_err(|e| EvaluatorError::Eval(e.to_string()))?;
        Ok(result.is_true())
    }
}

#[cfg(test)]
#[path = "expr_tests.rs"]
mod tests;
