// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sluice-gateway: admission control for incoming events
//!
//! Every event enters the store through the [`AdmissionPipeline`]: four
//! ordered stages that either hand back the envelope ready for append or
//! say exactly why it was refused. The pipeline holds no store handle;
//! appending an admitted event is the caller's explicit step.

mod outcome;
mod pipeline;

pub use outcome::{AdmissionDecision, AdmissionOutcome};
pub use pipeline::AdmissionPipeline;
