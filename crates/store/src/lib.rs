// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! sluice-store: partitioned append-only event store
//!
//! One global stream, totally ordered by a store-assigned gap-free
//! sequence, plus derived partitions keyed by source, subject, type,
//! correlation id, and causation id. Two backends share the same
//! in-memory index:
//!
//! ```text
//! append → StreamIndex (log + partition index + identity set)
//!              ↓ watch
//!         EventSubscription (catch-up, then live tail)
//!
//! JournalEventStore = StreamIndex + NDJSON journal (crc32 per line,
//! fsync per append, truncate-at-corruption recovery, fs2 lock)
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod error;
mod index;
pub mod journal;
pub mod memory;
pub mod read;
pub mod store;
pub mod subscription;

pub use error::StoreError;
pub use journal::JournalEventStore;
pub use memory::MemoryEventStore;
pub use read::{Direction, ReadRequest, MAX_READ_LENGTH};
pub use store::EventStore;
pub use subscription::EventSubscription;
