// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sluice read` - Page through the stream or one partition

use clap::Args;
use sluice_core::PartitionReference;
use sluice_daemon::protocol::Direction;

#[derive(Args)]
pub struct ReadArgs {
    /// Partition to read, as `<kind>:<id>` (e.g. `by-type:order.created`)
    #[arg(long)]
    pub partition: Option<PartitionReference>,

    /// Read newest-first instead of oldest-first
    #[arg(long)]
    pub backwards: bool,

    /// Global sequence to start from; defaults to the stream start (or
    /// end, when reading backwards)
    #[arg(long)]
    pub offset: Option<u64>,

    /// Page size
    #[arg(long, default_value = "10")]
    pub length: u64,
}

impl ReadArgs {
    pub fn direction(&self) -> Direction {
        if self.backwards {
            Direction::Backwards
        } else {
            Direction::Forwards
        }
    }
}
