// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Partition derivation and stream metadata types
//!
//! Partitions are derived, read-only views of the global stream. A record's
//! memberships are computed once, at append time, by a pure function of its
//! attributes; nothing ever re-partitions or reorders.

use serde::{Deserialize, Serialize};

use crate::event::CloudEvent;

/// The five attributes a partition can be keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartitionType {
    BySource,
    BySubject,
    ByType,
    ByCorrelationId,
    ByCausationId,
}

impl PartitionType {
    pub const ALL: [PartitionType; 5] = [
        PartitionType::BySource,
        PartitionType::BySubject,
        PartitionType::ByType,
        PartitionType::ByCorrelationId,
        PartitionType::ByCausationId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionType::BySource => "by-source",
            PartitionType::BySubject => "by-subject",
            PartitionType::ByType => "by-type",
            PartitionType::ByCorrelationId => "by-correlation-id",
            PartitionType::ByCausationId => "by-causation-id",
        }
    }
}

impl std::fmt::Display for PartitionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PartitionType {
    type Err = PartitionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PartitionType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| PartitionParseError::UnknownType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionParseError {
    #[error("unknown partition type: {0}")]
    UnknownType(String),
    #[error("expected <type>:<id>, got: {0}")]
    MissingId(String),
}

/// A reference to one partition: its keying attribute and the key value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionReference {
    pub kind: PartitionType,
    pub id: String,
}

impl PartitionReference {
    pub fn new(kind: PartitionType, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn by_source(id: impl Into<String>) -> Self {
        Self::new(PartitionType::BySource, id)
    }

    pub fn by_subject(id: impl Into<String>) -> Self {
        Self::new(PartitionType::BySubject, id)
    }

    pub fn by_type(id: impl Into<String>) -> Self {
        Self::new(PartitionType::ByType, id)
    }
}

impl std::fmt::Display for PartitionReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl std::str::FromStr for PartitionReference {
    type Err = PartitionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| PartitionParseError::MissingId(s.to_string()))?;
        if id.is_empty() {
            return Err(PartitionParseError::MissingId(s.to_string()));
        }
        Ok(Self { kind: kind.parse()?, id: id.to_string() })
    }
}

// Serialized in the display form, so documents and wire messages carry
// "by-type:order.created" rather than a two-field map.
impl Serialize for PartitionReference {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PartitionReference {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Derives every partition the event belongs to. One membership per
/// partition type whose key attribute is present; an absent attribute
/// contributes no membership and no default is invented. An empty
/// `subject` counts as absent.
pub fn partition_memberships(event: &CloudEvent) -> Vec<PartitionReference> {
    let mut memberships = vec![
        PartitionReference::by_source(event.source.clone()),
        PartitionReference::by_type(event.event_type.clone()),
    ];
    if let Some(subject) = event.subject.as_deref().filter(|s| !s.is_empty()) {
        memberships.push(PartitionReference::by_subject(subject));
    }
    if let Some(correlation) = event.correlation_id() {
        memberships.push(PartitionReference::new(PartitionType::ByCorrelationId, correlation));
    }
    if let Some(causation) = event.causation_id() {
        memberships.push(PartitionReference::new(PartitionType::ByCausationId, causation));
    }
    memberships
}

/// Aggregate view of the global stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMetadata {
    pub first_sequence: Option<u64>,
    pub last_sequence: Option<u64>,
    pub length: u64,
}

impl StreamMetadata {
    pub fn empty() -> Self {
        Self { first_sequence: None, last_sequence: None, length: 0 }
    }
}

/// Aggregate view of one populated partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionMetadata {
    pub partition: PartitionReference,
    pub first_sequence: u64,
    pub last_sequence: u64,
    pub length: u64,
}

#[cfg(test)]
#[path = "partition_tests.rs"]
mod tests;
