// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sluice watch` - Stream records live as they are appended

use clap::Args;
use sluice_core::PartitionReference;

#[derive(Args)]
pub struct WatchArgs {
    /// Partition to watch, as `<kind>:<id>`; absent watches the whole
    /// stream
    #[arg(long)]
    pub partition: Option<PartitionReference>,

    /// Replay from this global sequence before going live
    #[arg(long)]
    pub from: Option<u64>,
}
