// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The five error kinds shared across the engine (spec.md §7).
//!
//! These are kinds, not exhaustive leaf types — each crate still defines its
//! own `thiserror` enum for its own failure domain and converts into one of
//! these at the boundary where it becomes user-visible.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the five error kinds from spec.md §7, carrying a human-readable
/// detail string citing the offending entity name(s) and condition.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum WfmError {
    /// Workflow-description schema, name format, undefined variables,
    /// forbidden predefined-variable redefinition.
    #[error("validation error: {0}")]
    Validation(String),

    /// Session already exists, not-yet-started, not unique, step not found,
    /// step defined twice.
    #[error("state error: {0}")]
    State(String),

    /// Namespace already locked, reservation refused, partition unavailable.
    #[error("resource error: {0}")]
    Resource(String),

    /// Job-manager or resource-manager call failed, ephemeral-service
    /// start/stop command exited non-zero.
    #[error("external error: {0}")]
    External(String),

    /// Unknown service kind, unknown job manager, unknown resource manager.
    #[error("not supported: {0}")]
    NotSupported(String),
}

impl WfmError {
    pub fn validation(detail: impl Into<String>) -> Self {
        WfmError::Validation(detail.into())
    }

    pub fn state(detail: impl Into<String>) -> Self {
        WfmError::State(detail.into())
    }

    pub fn resource(detail: impl Into<String>) -> Self {
        WfmError::Resource(detail.into())
    }

    pub fn external(detail: impl Into<String>) -> Self {
        WfmError::External(detail.into())
    }

    pub fn not_supported(detail: impl Into<String>) -> Self {
        WfmError::NotSupported(detail.into())
    }

    /// The bare detail message, without the kind prefix — this is what
    /// crosses the HTTP boundary as `{"detail": ...}` (spec.md §6).
    pub fn detail(&self) -> String {
        match self {
            WfmError::Validation(d)
            | WfmError::State(d)
            | WfmError::Resource(d)
            | WfmError::External(d)
            | WfmError::NotSupported(d) => d.clone(),
        }
    }

    /// Whether the stop protocol should leave the session in TEARDOWN and
    /// expect a retry (spec.md §7 propagation policy).
    pub fn retry_expected(&self) -> bool {
        matches!(self, WfmError::External(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
