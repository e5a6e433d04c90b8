// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod daemon;
pub mod emit;
pub mod meta;
pub mod partitions;
pub mod read;
pub mod watch;
