// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription source adapters

mod file;

pub use file::FileSubscriptionSource;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSubscriptionSource;

use async_trait::async_trait;
use sluice_core::Subscription;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from listing the desired subscription set
#[derive(Debug, Error)]
pub enum SubscriptionSourceError {
    #[error("failed to read subscription directory {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Adapter for the control plane that owns subscription resources.
///
/// The broker polls `list` and reconciles against it; the source never
/// pushes. A single malformed resource must not take down the listing,
/// so implementations skip what they cannot parse.
#[async_trait]
pub trait SubscriptionSource: Clone + Send + Sync + 'static {
    /// The full desired subscription set, one entry per id.
    async fn list(&self) -> Result<Vec<Subscription>, SubscriptionSourceError>;
}
