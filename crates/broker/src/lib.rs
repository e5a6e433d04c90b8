// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sluice-broker: subscription dispatch over the event store
//!
//! The broker runs one tail task per active subscription. A task follows
//! the global stream or a single partition, applies the subscription's
//! predicate per record, and delivers matches to the sink with a bounded
//! timeout and capped exponential backoff. [`Broker::apply`] is the one
//! entry point for control-plane changes; [`SubscriptionWatcher`] turns a
//! polled subscription source into those changes.

mod dispatcher;
mod watcher;
mod worker;

pub use dispatcher::{Broker, BrokerDeps};
pub use watcher::SubscriptionWatcher;
