// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sluice partitions <KIND>` - List populated partitions of one kind

use clap::Args;
use sluice_core::PartitionType;

#[derive(Args)]
pub struct PartitionsArgs {
    /// Partition kind: `by-source`, `by-subject`, `by-type`,
    /// `by-correlation-id`, or `by-causation-id`
    pub kind: PartitionType,
}
