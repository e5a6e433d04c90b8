// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live, independently cursored stream tails

use std::sync::Arc;

use sluice_core::{CloudEventRecord, PartitionReference, SequencingConfig};
use tokio::sync::watch;

use crate::index::StreamIndex;

/// A catch-up-then-tail cursor over the global stream or one partition.
///
/// Each subscription owns its cursor; nothing is shared between calls to
/// `subscribe`, which is what lets one store feed the live broadcaster
/// and every dispatcher loop without interference. `next` is cancel-safe:
/// dropping the future between records loses nothing.
pub struct EventSubscription {
    index: Arc<StreamIndex>,
    sequencing: SequencingConfig,
    scope: Option<PartitionReference>,
    cursor: u64,
    appended: watch::Receiver<u64>,
}

impl EventSubscription {
    pub(crate) fn new(
        index: Arc<StreamIndex>,
        sequencing: SequencingConfig,
        scope: Option<PartitionReference>,
        from: Option<u64>,
    ) -> Self {
        let cursor = match from {
            Some(sequence) => sequence.saturating_sub(1),
            None => index.last_sequence(),
        };
        let appended = index.watch_appends();
        Self { index, sequencing, scope, cursor, appended }
    }

    /// Next record at or after the cursor; waits for an append when caught
    /// up. Returns `None` only if the store side of the watch channel is
    /// gone, which cannot happen while this subscription holds the index.
    pub async fn next(&mut self) -> Option<CloudEventRecord> {
        loop {
            if let Some(record) = self.index.next_after(self.cursor, self.scope.as_ref()) {
                self.cursor = record.sequence;
                return Some(self.sequencing.apply(record));
            }
            if self.appended.changed().await.is_err() {
                return None;
            }
        }
    }

    /// Last sequence handed out (0 before the first record).
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn scope(&self) -> Option<&PartitionReference> {
        self.scope.as_ref()
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
