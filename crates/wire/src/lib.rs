// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! wfm-wire: the JSON request/response shapes of the HTTP surface
//! (spec.md §6), shared by the daemon's handlers and the CLI's client.
//!
//! Every endpoint answers 200 with a body below on success, or 404 with
//! [`ErrorResponse`] on failure — the daemon owns that mapping, this crate
//! only owns the shapes.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod request;
pub mod response;

pub use request::{
    AccessRequest, StartSessionRequest, StartStepRequest, StepProgressRequest, StopSessionRequest,
};
pub use response::{
    ErrorResponse, ServiceSummary, SessionDetailedView, SessionSummary, StartStepResponse,
    StepDescriptionSummary, StepInstanceSummary, StepStatusSummary,
};

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
