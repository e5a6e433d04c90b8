// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable journal backend
//!
//! One NDJSON line per record, checksummed with CRC32 and fsynced before
//! the append returns. Recovery replays the journal into the shared
//! index, stopping at the first torn or corrupt line and truncating the
//! file there, so a crash mid-write costs at most the unacknowledged
//! record. An exclusive advisory lock on the journal file keeps the
//! process the single writer.

pub mod entry;
pub mod reader;
pub mod store;

pub use entry::JournalEntry;
pub use reader::{JournalEntryIter, JournalReadError, JournalReader};
pub use store::JournalEventStore;
