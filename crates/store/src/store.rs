// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The abstract store capability

use async_trait::async_trait;
use sluice_core::{
    CloudEvent, CloudEventRecord, PartitionMetadata, PartitionReference, PartitionType,
    StreamMetadata,
};

use crate::error::StoreError;
use crate::read::ReadRequest;
use crate::subscription::EventSubscription;

/// A partitioned, append-only event store.
///
/// All operations are safe for concurrent callers. Sequences are 1-based,
/// strictly increasing, and gap-free on the global stream; partition
/// streams preserve the relative global order of their members. Metadata
/// reflects every append that completed before the call started: both
/// backends index synchronously inside the append's write section, so
/// there is no staleness window.
#[async_trait]
pub trait EventStore: Clone + Send + Sync + 'static {
    /// Appends an admitted event, assigning the next sequence atomically
    /// with respect to all other appends. Fails with
    /// [`StoreError::DuplicateEvent`] when `id`+`source` was seen before.
    async fn append(&self, event: CloudEvent) -> Result<CloudEventRecord, StoreError>;

    /// Bounded read of the global stream. Reading past the end yields a
    /// short or empty result; a repeated call re-reads the same range.
    async fn read(&self, request: ReadRequest) -> Result<Vec<CloudEventRecord>, StoreError>;

    /// Bounded read of one partition's stream, in global-stream order.
    /// Fails with [`StoreError::PartitionNotFound`] for a partition that
    /// has never been populated.
    async fn read_partition(
        &self,
        partition: &PartitionReference,
        request: ReadRequest,
    ) -> Result<Vec<CloudEventRecord>, StoreError>;

    /// Live tail of the global stream: catch up from `from` (stream end
    /// when `None`), then follow new appends. Every call is independently
    /// cursored.
    fn subscribe(&self, from: Option<u64>) -> EventSubscription;

    /// Live tail scoped to one partition. Valid for a partition that does
    /// not exist yet; it emits once the partition gains members.
    fn subscribe_partition(
        &self,
        partition: PartitionReference,
        from: Option<u64>,
    ) -> EventSubscription;

    async fn stream_metadata(&self) -> Result<StreamMetadata, StoreError>;

    async fn partition_metadata(
        &self,
        partition: &PartitionReference,
    ) -> Result<PartitionMetadata, StoreError>;

    /// Ids of every populated partition of one type, sorted.
    async fn list_partition_ids(&self, kind: PartitionType) -> Result<Vec<String>, StoreError>;
}
