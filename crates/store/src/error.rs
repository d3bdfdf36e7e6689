// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed failures for the materialized store, converted into [`WfmError`]
//! at the boundary where callers see one of the five shared kinds.

use thiserror::Error;
use wfm_core::WfmError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("session {0} not found")]
    SessionNotFound(String),
    #[error("service {0} not found")]
    ServiceNotFound(String),
    #[error("step description {0} not found")]
    StepDescriptionNotFound(String),
    #[error("step instance {0} not found")]
    StepInstanceNotFound(String),
    #[error("session '{name}' already exists for workflow '{workflow}' and user '{user}'")]
    DuplicateSession { name: String, workflow: String, user: String },
    #[error("step '{0}' already declared in this session")]
    DuplicateStepDescription(String),
    #[error("step instance name '{0}' already in use")]
    DuplicateStepInstanceName(String),
    #[error("namespace '{0}' is already in use by service '{1}'")]
    NamespaceLocked(String, String),
    #[error("namespace '{0}' is not locked")]
    NamespaceNotLocked(String),
    #[error("session {0} is not stopped")]
    SessionNotStopped(String),
}

impl From<StoreError> for WfmError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SessionNotFound(_)
            | StoreError::ServiceNotFound(_)
            | StoreError::StepDescriptionNotFound(_)
            | StoreError::StepInstanceNotFound(_) => WfmError::state(err.to_string()),
            StoreError::DuplicateSession { .. }
            | StoreError::DuplicateStepDescription(_)
            | StoreError::DuplicateStepInstanceName(_)
            | StoreError::SessionNotStopped(_) => WfmError::state(err.to_string()),
            StoreError::NamespaceLocked(..) | StoreError::NamespaceNotLocked(_) => {
                WfmError::resource(err.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
