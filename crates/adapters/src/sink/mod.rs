// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery sink adapters

mod http;

pub use http::HttpEventSink;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeEventSink, SinkCall};

use async_trait::async_trait;
use sluice_core::CloudEvent;
use std::time::Duration;
use thiserror::Error;

/// Errors from event delivery
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("delivery transport failed: {0}")]
    Transport(String),
    #[error("sink answered with status {status}")]
    Status { status: u16 },
    #[error("delivery timed out after {}s", timeout.as_secs())]
    Timeout { timeout: Duration },
}

/// Adapter for delivering events to a subscriber's sink.
///
/// Every error is retriable from the dispatcher's point of view; the sink
/// reports what happened, the caller decides whether to try again.
#[async_trait]
pub trait EventSink: Clone + Send + Sync + 'static {
    /// Deliver one event to a sink address.
    async fn deliver(&self, sink: &str, event: &CloudEvent) -> Result<(), SinkError>;
}
