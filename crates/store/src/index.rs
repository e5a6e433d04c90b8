// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared in-memory stream index
//!
//! Both store backends keep the authoritative runtime state here: the
//! append log, the per-partition sequence lists, the id+source identity
//! set, and the watch channel that wakes live subscriptions. Every
//! mutation happens inside one write section, so a reader can never see a
//! record in a partition but not on the global stream.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use sluice_core::{
    partition_memberships, CloudEvent, CloudEventRecord, PartitionMetadata, PartitionReference,
    PartitionType, StreamMetadata,
};
use tokio::sync::watch;

use crate::error::StoreError;
use crate::read::{Direction, ReadRequest};

#[derive(Debug)]
pub(crate) struct StreamIndex {
    inner: RwLock<IndexInner>,
    appended: watch::Sender<u64>,
}

#[derive(Debug, Default)]
struct IndexInner {
    /// `records[i].sequence == i + 1`; sequences are 1-based and gap-free.
    records: Vec<CloudEventRecord>,
    /// Ascending global sequences per populated partition.
    partitions: HashMap<PartitionReference, Vec<u64>>,
    /// `(source, id)` pairs already admitted.
    identities: HashSet<(String, String)>,
}

impl StreamIndex {
    pub(crate) fn new() -> Self {
        let (appended, _) = watch::channel(0u64);
        Self { inner: RwLock::new(IndexInner::default()), appended }
    }

    /// Assigns the next sequence and links the record everywhere at once.
    pub(crate) fn append(&self, event: CloudEvent) -> Result<CloudEventRecord, StoreError> {
        let record = {
            let mut inner = self.write();
            inner.check_identity(&event)?;
            let sequence = inner.records.len() as u64 + 1;
            let record = CloudEventRecord::new(sequence, event);
            inner.link(record.clone());
            record
        };
        self.appended.send_replace(record.sequence);
        Ok(record)
    }

    /// Inserts a record whose sequence was assigned elsewhere (journal
    /// replay, or a journal append that already holds the writer lock).
    /// The sequence chain and identity uniqueness are re-checked so a
    /// damaged journal cannot poison the index.
    pub(crate) fn append_assigned(&self, record: CloudEventRecord) -> Result<(), StoreError> {
        let sequence = record.sequence;
        {
            let mut inner = self.write();
            let expected = inner.records.len() as u64 + 1;
            if sequence != expected {
                return Err(StoreError::Corrupt {
                    line: sequence,
                    reason: format!("expected sequence {expected}, found {sequence}"),
                });
            }
            inner.check_identity(&record.event)?;
            inner.link(record);
        }
        self.appended.send_replace(sequence);
        Ok(())
    }

    pub(crate) fn next_sequence(&self) -> u64 {
        self.read_lock().records.len() as u64 + 1
    }

    pub(crate) fn contains_identity(&self, source: &str, id: &str) -> bool {
        self.read_lock().identities.contains(&(source.to_string(), id.to_string()))
    }

    pub(crate) fn read(&self, request: ReadRequest) -> Vec<CloudEventRecord> {
        let inner = self.read_lock();
        let len = inner.records.len() as u64;
        let budget = request.clamped_length();
        match request.direction {
            Direction::Forwards => {
                let start = request.offset.unwrap_or(0).max(1);
                if start > len {
                    return Vec::new();
                }
                inner.records[(start - 1) as usize..].iter().take(budget).cloned().collect()
            }
            Direction::Backwards => {
                let start = request.offset.unwrap_or(len).min(len);
                if start == 0 {
                    return Vec::new();
                }
                inner.records[..start as usize].iter().rev().take(budget).cloned().collect()
            }
        }
    }

    pub(crate) fn read_partition(
        &self,
        partition: &PartitionReference,
        request: ReadRequest,
    ) -> Result<Vec<CloudEventRecord>, StoreError> {
        let inner = self.read_lock();
        let sequences = inner
            .partitions
            .get(partition)
            .ok_or_else(|| StoreError::PartitionNotFound(partition.clone()))?;
        let budget = request.clamped_length();
        let picked: Vec<u64> = match request.direction {
            Direction::Forwards => {
                let start = request.offset.unwrap_or(0).max(1);
                let from = sequences.partition_point(|s| *s < start);
                sequences[from..].iter().take(budget).copied().collect()
            }
            Direction::Backwards => {
                let start = request.offset.unwrap_or(inner.records.len() as u64);
                let to = sequences.partition_point(|s| *s <= start);
                sequences[..to].iter().rev().take(budget).copied().collect()
            }
        };
        Ok(picked.into_iter().map(|s| inner.records[(s - 1) as usize].clone()).collect())
    }

    /// First record after `cursor`, optionally scoped to one partition.
    pub(crate) fn next_after(
        &self,
        cursor: u64,
        scope: Option<&PartitionReference>,
    ) -> Option<CloudEventRecord> {
        let inner = self.read_lock();
        match scope {
            None => inner.records.get(cursor as usize).cloned(),
            Some(partition) => {
                let sequences = inner.partitions.get(partition)?;
                let idx = sequences.partition_point(|s| *s <= cursor);
                sequences.get(idx).map(|s| inner.records[(*s - 1) as usize].clone())
            }
        }
    }

    pub(crate) fn stream_metadata(&self) -> StreamMetadata {
        let inner = self.read_lock();
        match inner.records.len() as u64 {
            0 => StreamMetadata::empty(),
            len => StreamMetadata {
                first_sequence: Some(1),
                last_sequence: Some(len),
                length: len,
            },
        }
    }

    pub(crate) fn partition_metadata(
        &self,
        partition: &PartitionReference,
    ) -> Result<PartitionMetadata, StoreError> {
        let inner = self.read_lock();
        let sequences = inner
            .partitions
            .get(partition)
            .ok_or_else(|| StoreError::PartitionNotFound(partition.clone()))?;
        Ok(PartitionMetadata {
            partition: partition.clone(),
            first_sequence: sequences[0],
            last_sequence: sequences[sequences.len() - 1],
            length: sequences.len() as u64,
        })
    }

    pub(crate) fn list_partition_ids(&self, kind: PartitionType) -> Vec<String> {
        let inner = self.read_lock();
        let mut ids: Vec<String> = inner
            .partitions
            .keys()
            .filter(|p| p.kind == kind)
            .map(|p| p.id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub(crate) fn last_sequence(&self) -> u64 {
        self.read_lock().records.len() as u64
    }

    pub(crate) fn watch_appends(&self) -> watch::Receiver<u64> {
        self.appended.subscribe()
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, IndexInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, IndexInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl IndexInner {
    fn check_identity(&self, event: &CloudEvent) -> Result<(), StoreError> {
        if self.identities.contains(&(event.source.clone(), event.id.clone())) {
            return Err(StoreError::DuplicateEvent {
                source: event.source.clone(),
                id: event.id.clone(),
            });
        }
        Ok(())
    }

    fn link(&mut self, record: CloudEventRecord) {
        for membership in partition_memberships(&record.event) {
            self.partitions.entry(membership).or_default().push(record.sequence);
        }
        self.identities.insert((record.event.source.clone(), record.event.id.clone()));
        self.records.push(record);
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
