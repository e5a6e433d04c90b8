//! Behavioral specifications for the sluice CLI.
//!
//! These tests are black-box: they invoke the CLI binary and verify
//! stdout, stderr, and exit codes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/errors.rs"]
mod cli_errors;
#[path = "specs/cli/help.rs"]
mod cli_help;

// daemon/
#[path = "specs/daemon/lifecycle.rs"]
mod daemon_lifecycle;
#[path = "specs/daemon/logs.rs"]
mod daemon_logs;

// stream/
#[path = "specs/stream/roundtrip.rs"]
mod stream_roundtrip;
#[path = "specs/stream/watch.rs"]
mod stream_watch;

// subscriptions/
#[path = "specs/subscriptions/listing.rs"]
mod subscriptions_listing;
