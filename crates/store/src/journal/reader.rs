// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Journal reading with corruption detection
//!
//! Reads stop at the first torn or corrupt line; everything before it is
//! trusted. The iterator tracks the byte position after the last valid
//! entry so recovery can truncate precisely.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::entry::JournalEntry;

#[derive(Debug, Error)]
pub enum JournalReadError {
    #[error("journal corrupted at line {line}: {reason}")]
    Corrupted { line: u64, reason: String },
    #[error("journal checksum mismatch at line {line}")]
    ChecksumMismatch { line: u64 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct JournalReader {
    path: PathBuf,
}

impl JournalReader {
    /// A missing file reads as an empty journal.
    pub fn open(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }

    pub fn entries(&self) -> Result<JournalEntryIter, JournalReadError> {
        JournalEntryIter::new(&self.path)
    }

    /// Number of valid entries before the first corruption, or the
    /// corruption itself when strictness is wanted.
    pub fn validate(&self) -> Result<u64, JournalReadError> {
        let mut count = 0;
        for entry in self.entries()? {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Iterator over journal entries with position tracking. Fused after the
/// first error.
pub struct JournalEntryIter {
    reader: Option<BufReader<File>>,
    line_number: u64,
    last_valid_position: u64,
    current_position: u64,
    failed: bool,
}

impl JournalEntryIter {
    fn new(path: &Path) -> Result<Self, JournalReadError> {
        let reader = if path.exists() {
            Some(BufReader::new(File::open(path)?))
        } else {
            None
        };
        Ok(Self {
            reader,
            line_number: 0,
            last_valid_position: 0,
            current_position: 0,
            failed: false,
        })
    }

    /// Byte offset just past the last entry that parsed and verified.
    pub fn last_valid_position(&self) -> u64 {
        self.last_valid_position
    }
}

impl Iterator for JournalEntryIter {
    type Item = Result<JournalEntry, JournalReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let reader = self.reader.as_mut()?;
        loop {
            let mut line = String::new();
            let bytes = match reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(n) => n,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(JournalReadError::Io(err)));
                }
            };
            self.current_position += bytes as u64;
            self.line_number += 1;

            let trimmed = line.trim_end_matches('\n');
            if trimmed.is_empty() {
                continue;
            }

            match JournalEntry::from_line(trimmed) {
                Ok(entry) if entry.verify() => {
                    self.last_valid_position = self.current_position;
                    return Some(Ok(entry));
                }
                Ok(_) => {
                    self.failed = true;
                    return Some(Err(JournalReadError::ChecksumMismatch {
                        line: self.line_number,
                    }));
                }
                Err(err) => {
                    self.failed = true;
                    return Some(Err(JournalReadError::Corrupted {
                        line: self.line_number,
                        reason: err.to_string(),
                    }));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
