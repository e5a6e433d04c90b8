// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription resources and their runtime lifecycle states
//!
//! Subscriptions are owned by an external control plane; the broker only
//! consumes them. The TOML document form here is what the file-backed
//! source reads from disk.

use serde::{Deserialize, Serialize};

use crate::attributes;
use crate::partition::PartitionReference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DesiredState {
    #[default]
    Active,
    Suspended,
}

/// What a subscription wants delivered: an optional partition scope plus
/// an optional predicate expression evaluated per record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SubscriptionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<PartitionReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Subscription {
    pub id: String,
    #[serde(default)]
    pub filter: SubscriptionFilter,
    /// Sink URI the subscription delivers matching events to.
    pub sink: String,
    #[serde(default)]
    pub desired_state: DesiredState,
}

impl Subscription {
    pub fn new(id: impl Into<String>, sink: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filter: SubscriptionFilter::default(),
            sink: sink.into(),
            desired_state: DesiredState::Active,
        }
    }

    pub fn with_partition(mut self, partition: PartitionReference) -> Self {
        self.filter.partition = Some(partition);
        self
    }

    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.filter.predicate = Some(predicate.into());
        self
    }

    pub fn suspended(mut self) -> Self {
        self.desired_state = DesiredState::Suspended;
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self, SubscriptionParseError> {
        let subscription: Subscription = toml::from_str(text)?;
        subscription.check()?;
        Ok(subscription)
    }

    fn check(&self) -> Result<(), SubscriptionParseError> {
        if self.id.is_empty() {
            return Err(SubscriptionParseError::MissingId);
        }
        if !attributes::is_valid_uri_ref(&self.sink) {
            return Err(SubscriptionParseError::BadSink(self.sink.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionParseError {
    #[error("invalid subscription document: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("subscription id must not be empty")]
    MissingId,
    #[error("subscription sink is not a URI reference: {0:?}")]
    BadSink(String),
}

/// Lifecycle states a subscription moves through inside the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubscriptionPhase {
    Starting,
    Active,
    Reconciling,
    Suspended,
    Faulted,
    Stopped,
}

impl std::fmt::Display for SubscriptionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SubscriptionPhase::Starting => "starting",
            SubscriptionPhase::Active => "active",
            SubscriptionPhase::Reconciling => "reconciling",
            SubscriptionPhase::Suspended => "suspended",
            SubscriptionPhase::Faulted => "faulted",
            SubscriptionPhase::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Control-plane notification consumed by the broker's reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionChange {
    Upserted(Subscription),
    Deleted(String),
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
