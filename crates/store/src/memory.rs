// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store backend

use std::sync::Arc;

use async_trait::async_trait;
use sluice_core::{
    CloudEvent, CloudEventRecord, PartitionMetadata, PartitionReference, PartitionType,
    SequencingConfig, StreamMetadata,
};

use crate::error::StoreError;
use crate::index::StreamIndex;
use crate::read::ReadRequest;
use crate::store::EventStore;
use crate::subscription::EventSubscription;

/// Volatile backend: just the shared index. Used for tests and for
/// deployments that treat the mesh as a pure fan-out with no replay needs.
#[derive(Clone)]
pub struct MemoryEventStore {
    index: Arc<StreamIndex>,
    sequencing: SequencingConfig,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::with_sequencing(SequencingConfig::default())
    }

    pub fn with_sequencing(sequencing: SequencingConfig) -> Self {
        Self { index: Arc::new(StreamIndex::new()), sequencing }
    }
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn append(&self, event: CloudEvent) -> Result<CloudEventRecord, StoreError> {
        self.index.append(event)
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
#[path = "memory_tests.rs"]
mod tests;
