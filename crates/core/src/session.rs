// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identifier and lifecycle status.
//!
//! A session is one activation of a workflow: a collection of provisioned
//! services and instantiated steps, scoped to `(name, workflow_name, user)`.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a session.
    pub struct SessionId("ses-");
}

/// Status of a session in its lifecycle (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Services are being provisioned; not all are usable yet.
    Starting,
    /// Every service used by a step is ALLOCATED/STAGEDIN.
    Active,
    /// Stop has been requested; new step submissions are refused.
    Stopping,
    /// Every service has been torn down; cleanup is about to run.
    Stopped,
    /// Stop or start failed partway through; safe to retry.
    Teardown,
    /// State could not be determined (reconciler couldn't reach a verdict).
    Unknown,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Stopped)
    }
}

crate::simple_display! {
    SessionStatus {
        Starting => "starting",
        Active => "active",
        Stopping => "stopping",
        Stopped => "stopped",
        Teardown => "teardown",
        Unknown => "unknown",
    }
}

/// A session row (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub workflow_name: String,
    pub user: String,
    pub start_ts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_ts: Option<u64>,
    pub status: SessionStatus,
}

impl Session {
    pub fn new(
        name: impl Into<String>,
        workflow_name: impl Into<String>,
        user: impl Into<String>,
        start_ts: u64,
    ) -> Self {
        Self {
            id: SessionId::new(),
            name: name.into(),
            workflow_name: workflow_name.into(),
            user: user.into(),
            start_ts,
            end_ts: None,
            status: SessionStatus::Starting,
        }
    }
}

crate::builder! {
    pub struct SessionBuilder => Session {
        into {
            name: String = "demo-session",
            workflow_name: String = "demo-workflow",
            user: String = "demo-user",
        }
        set {
            start_ts: u64 = 1_000_000,
            status: SessionStatus = SessionStatus::Starting,
        }
        option {
            end_ts: u64 = None,
        }
        computed {
            id: SessionId = SessionId::new(),
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
