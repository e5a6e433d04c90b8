// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sluice-daemon: the long-running `sluiced` process
//!
//! Owns the event store, the admission pipeline and the broker, and serves
//! CLI clients over a Unix socket speaking length-prefixed JSON frames.
//! The `sluiced` binary wires these modules together; the CLI links this
//! library for the protocol types and the path layout.

pub mod lifecycle;
pub mod protocol;
pub mod server;

pub use protocol::{Request, Response, SubscriptionStatus, PROTOCOL_VERSION};
