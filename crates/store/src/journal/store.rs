// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Journal-backed store with crash recovery

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fs2::FileExt;
use sluice_core::{
    CloudEvent, CloudEventRecord, PartitionMetadata, PartitionReference, PartitionType,
    SequencingConfig, StreamMetadata,
};

use super::entry::JournalEntry;
use super::reader::JournalReader;
use crate::error::StoreError;
use crate::index::StreamIndex;
use crate::read::ReadRequest;
use crate::store::EventStore;
use crate::subscription::EventSubscription;

/// Durable backend: the shared index plus an append-only journal.
///
/// The append handle holds an exclusive advisory lock for the store's
/// lifetime, so exactly one process writes the journal. Sequence
/// assignment and the journal write happen under one writer mutex; the
/// index is only updated after the line is fsynced, which keeps memory a
/// strict subset of disk.
#[derive(Clone, Debug)]
pub struct JournalEventStore {
    index: Arc<StreamIndex>,
    writer: Arc<Mutex<JournalWriter>>,
    sequencing: SequencingConfig,
}

#[derive(Debug)]
struct JournalWriter {
    file: File,
    #[allow(dead_code)] // NOTE: path kept for diagnostics on write errors
    path: PathBuf,
}

impl JournalEventStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with_sequencing(path, SequencingConfig::default())
    }

    pub fn open_with_sequencing(
        path: &Path,
        sequencing: SequencingConfig,
    ) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        file.try_lock_exclusive()
            .map_err(|_| StoreError::Locked { path: path.display().to_string() })?;

        let index = Arc::new(StreamIndex::new());
        let recovered = replay(path, &index)?;
        tracing::info!(path = %path.display(), recovered, "journal opened");

        Ok(Self {
            index,
            writer: Arc::new(Mutex::new(JournalWriter { file, path: path.to_path_buf() })),
            sequencing,
        })
    }

    pub fn sequencing(&self) -> &SequencingConfig {
        &self.sequencing
    }
}

/// Replays the journal into the index, truncating a corrupt tail. Returns
/// the number of recovered records.
fn replay(path: &Path, index: &StreamIndex) -> Result<u64, StoreError> {
    let reader = JournalReader::open(path);
    let mut iter = reader.entries().map_err(io_from_read)?;
    let mut recovered = 0u64;
    let mut corruption = None;
    for item in iter.by_ref() {
        match item {
            Ok(entry) => {
                index.append_assigned(entry.into_record())?;
                recovered += 1;
            }
            Err(err) => {
                corruption = Some(err);
                break;
            }
        }
    }
    if let Some(err) = corruption {
        let keep = iter.last_valid_position();
        tracing::warn!(
            path = %path.display(),
            error = %err,
            keep_bytes = keep,
            "journal tail unreadable, truncating"
        );
        let repair = OpenOptions::new().write(true).open(path)?;
        repair.set_len(keep)?;
        repair.sync_all()?;
    }
    Ok(recovered)
}

fn io_from_read(err: super::reader::JournalReadError) -> StoreError {
    match err {
        super::reader::JournalReadError::Io(io) => StoreError::Unavailable(io),
        other => StoreError::Corrupt { line: 0, reason: other.to_string() },
    }
}

#[async_trait]
impl EventStore for JournalEventStore {
    async fn append(&self, event: CloudEvent) -> Result<CloudEventRecord, StoreError> {
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        if self.index.contains_identity(&event.source, &event.id) {
            return Err(StoreError::DuplicateEvent { source: event.source, id: event.id });
        }
        let sequence = self.index.next_sequence();
        let record = CloudEventRecord::new(sequence, event);
        let line = JournalEntry::from_record(&record)?.to_line()?;
        writeln!(writer.file, "{line}")?;
        writer.file.sync_all()?;
        // disk write is durable; the in-memory link cannot fail the checks
        // re-done here because the writer mutex serialized everything
        self.index.append_assigned(record.clone())?;
        Ok(record)
    }

    async fn read(&self, request: ReadRequest) -> Result<Vec<CloudEventRecord>, StoreError> {
        let records = self.index.read(request);
        Ok(records.into_iter().map(|r| self.sequencing.apply(r)).collect())
    }

    async fn read_partition(
        &self,
        partition: &PartitionReference,
        request: ReadRequest,
    ) -> Result<Vec<CloudEventRecord>, StoreError> {
        let records = self.index.read_partition(partition, request)?;
        Ok(records.into_iter().map(|r| self.sequencing.apply(r)).collect())
    }

    fn subscribe(&self, from: Option<u64>) -> EventSubscription {
        EventSubscription::new(Arc::clone(&self.index), self.sequencing.clone(), None, from)
    }

    fn subscribe_partition(
        &self,
        partition: PartitionReference,
        from: Option<u64>,
    ) -> EventSubscription {
        EventSubscription::new(
            Arc::clone(&self.index),
            self.sequencing.clone(),
            Some(partition),
            from,
        )
    }

    async fn stream_metadata(&self) -> Result<StreamMetadata, StoreError> {
        Ok(self.index.stream_metadata())
    }

    async fn partition_metadata(
        &self,
        partition: &PartitionReference,
    ) -> Result<PartitionMetadata, StoreError> {
        self.index.partition_metadata(partition)
    }

    async fn list_partition_ids(&self, kind: PartitionType) -> Result<Vec<String>, StoreError> {
        Ok(self.index.list_partition_ids(kind))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
