// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One journal line: a record plus its integrity checksum

use serde::{Deserialize, Serialize};
use sluice_core::{CloudEvent, CloudEventRecord};

/// A record as persisted. The checksum covers the canonical JSON of
/// `{sequence, event}`; serde_json orders map keys, so the serialization
/// is stable across write and verify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub sequence: u64,
    pub event: CloudEvent,
    pub checksum: u32,
}

#[derive(Serialize)]
struct Payload<'a> {
    sequence: u64,
    event: &'a CloudEvent,
}

impl JournalEntry {
    pub fn from_record(record: &CloudEventRecord) -> Result<Self, serde_json::Error> {
        let checksum = checksum_of(record.sequence, &record.event)?;
        Ok(Self { sequence: record.sequence, event: record.event.clone(), checksum })
    }

    /// True when the stored checksum matches the payload. A payload that
    /// no longer serializes also fails verification.
    pub fn verify(&self) -> bool {
        checksum_of(self.sequence, &self.event).map(|c| c == self.checksum).unwrap_or(false)
    }

    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    pub fn into_record(self) -> CloudEventRecord {
        CloudEventRecord::new(self.sequence, self.event)
    }
}

fn checksum_of(sequence: u64, event: &CloudEvent) -> Result<u32, serde_json::Error> {
    let payload = serde_json::to_string(&Payload { sequence, event })?;
    Ok(crc32fast::hash(payload.as_bytes()))
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
