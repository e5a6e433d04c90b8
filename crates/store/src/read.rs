// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read request shapes shared by every store backend

use serde::{Deserialize, Serialize};

/// Upper bound on records returned by a single read; requests clamp to
/// `1..=MAX_READ_LENGTH` rather than failing.
pub const MAX_READ_LENGTH: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Forwards,
    Backwards,
}

/// A bounded, restartable read. `offset` is a global sequence number and
/// defaults to the stream start for forward reads and the stream end for
/// backward reads. Reading past the end yields a short or empty result,
/// never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRequest {
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    pub length: u64,
}

impl ReadRequest {
    pub fn forwards(length: u64) -> Self {
        Self { direction: Direction::Forwards, offset: None, length }
    }

    pub fn backwards(length: u64) -> Self {
        Self { direction: Direction::Backwards, offset: None, length }
    }

    pub fn from_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// The effective record budget after clamping.
    pub fn clamped_length(&self) -> usize {
        self.length.clamp(1, MAX_READ_LENGTH) as usize
    }
}

#[cfg(test)]
#[path = "read_tests.rs"]
mod tests;
