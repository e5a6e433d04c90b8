// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the gateway's and broker's external collaborators

pub mod eval;
pub mod metrics;
pub mod schema;
pub mod sink;
pub mod source;
pub mod traced;

pub use eval::{Evaluator, EvaluatorError, ExprEvaluator, NoOpEvaluator};
pub use metrics::{CounterMetrics, LabelledCount, MetricsSink, MetricsSnapshot, NoOpMetrics};
pub use schema::{
    EventSchema, NoOpSchemaRegistry, SchemaCatalogError, SchemaRegistry, SchemaRegistryError,
    SchemaType, StaticSchemaRegistry,
};
pub use sink::{EventSink, HttpEventSink, SinkError};
pub use source::{FileSubscriptionSource, SubscriptionSource, SubscriptionSourceError};
pub use traced::TracedSink;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use eval::{EvalCall, FakeEvaluator};
#[cfg(any(test, feature = "test-support"))]
pub use schema::{FakeSchemaRegistry, SchemaCall};
#[cfg(any(test, feature = "test-support"))]
pub use sink::{FakeEventSink, SinkCall};
#[cfg(any(test, feature = "test-support"))]
pub use source::FakeSubscriptionSource;
