// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Projection of the store-assigned sequence into an extension attribute

use serde::{Deserialize, Serialize};

use crate::event::CloudEventRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SequencingStrategy {
    /// Records are returned untouched.
    #[default]
    None,
    /// The sequence is projected into an extension attribute on read.
    Attribute,
}

/// What to do when the target attribute already exists on the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictResolution {
    #[default]
    Overwrite,
    /// Keep the producer's attribute and place the sequence under
    /// `fallback_attribute_name` instead.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct SequencingConfig {
    pub strategy: SequencingStrategy,
    pub attribute_name: String,
    pub conflict: ConflictResolution,
    pub fallback_attribute_name: String,
}

impl Default for SequencingConfig {
    fn default() -> Self {
        Self {
            strategy: SequencingStrategy::None,
            attribute_name: "sequence".to_string(),
            conflict: ConflictResolution::Overwrite,
            fallback_attribute_name: "storedsequence".to_string(),
        }
    }
}

impl SequencingConfig {
    /// Attribute projection under `name`, overwriting on conflict.
    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            strategy: SequencingStrategy::Attribute,
            attribute_name: name.into(),
            ..Self::default()
        }
    }

    /// Applies the projection to a record leaving the store. The stored
    /// form is never mutated; reads project on the way out.
    pub fn apply(&self, record: CloudEventRecord) -> CloudEventRecord {
        match self.strategy {
            SequencingStrategy::None => record,
            SequencingStrategy::Attribute => self.project(record),
        }
    }

    fn project(&self, mut record: CloudEventRecord) -> CloudEventRecord {
        let sequence = record.sequence;
        let occupied = record.event.extension(&self.attribute_name).is_some();
        let target = if occupied && self.conflict == ConflictResolution::Fallback {
            self.fallback_attribute_name.as_str()
        } else {
            self.attribute_name.as_str()
        };
        record.event.set_extension(target, sequence);
        record
    }
}

#[cfg(test)]
#[path = "sequencing_tests.rs"]
mod tests;
