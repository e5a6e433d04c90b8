// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sluice meta` - Stream and partition shapes

use clap::Args;
use sluice_core::PartitionReference;

#[derive(Args)]
pub struct MetaArgs {
    /// Partition to describe, as `<kind>:<id>`; absent describes the
    /// whole stream
    #[arg(long)]
    pub partition: Option<PartitionReference>,
}
