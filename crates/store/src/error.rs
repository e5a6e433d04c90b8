// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store error taxonomy

use sluice_core::PartitionReference;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Read against a partition that has never been populated.
    #[error("partition not found: {0}")]
    PartitionNotFound(PartitionReference),

    /// `id` + `source` must be unique across the store.
    #[error("duplicate event {id:?} from source {source:?}")]
    DuplicateEvent { r#source: String, id: String },

    /// Transient infrastructure failure; callers retry per their policy.
    #[error("store unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    /// Another process holds the journal.
    #[error("journal is locked by another process: {path}")]
    Locked { path: String },

    /// Replay found an entry the store cannot accept (broken sequence
    /// chain or duplicated identity), pointing at a damaged journal.
    #[error("journal corrupt at line {line}: {reason}")]
    Corrupt { line: u64, reason: String },

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
