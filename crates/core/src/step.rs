// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step description (template) and step instance (one execution) types.

use crate::service::ServiceId;
use crate::session::SessionId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a step description.
    pub struct StepDescriptionId("sdi-");
}

crate::define_id! {
    /// Unique identifier for a step instance.
    pub struct StepInstanceId("sti-");
}

/// Sentinel `service_id` value meaning "this step uses no service".
pub const NO_SERVICE: u64 = 0;

/// Static declaration of a step within a workflow (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDescription {
    pub id: StepDescriptionId,
    pub session_id: SessionId,
    /// `None` means the step declared no service (sentinel `service_id = 0`).
    #[serde(default)]
    pub service_id: Option<ServiceId>,
    pub name: String,
    pub command: String,
}

/// Status of a step instance (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepInstanceStatus {
    Starting,
    Running,
    Stopping,
    Stopped,
    Suspended,
}

crate::simple_display! {
    StepInstanceStatus {
        Starting => "starting",
        Running => "running",
        Stopping => "stopping",
        Stopped => "stopped",
        Suspended => "suspended",
    }
}

/// One execution of a step description (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepInstance {
    pub id: StepInstanceId,
    pub step_description_id: StepDescriptionId,
    /// Globally unique: `{user}-{session}-{step}_{n}`.
    pub instance_name: String,
    pub start_ts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_ts: Option<u64>,
    pub status: StepInstanceStatus,
    /// Externally-posted progress string (spec.md §4.G.5: `POST
    /// /step/progress/job`), persisted verbatim. Distinct from
    /// `raw_job_status`: the two are written by unrelated call paths and
    /// must not alias the same storage.
    #[serde(default)]
    pub progress: String,
    /// Raw, possibly blank-separated job-manager status string refreshed on
    /// every read path by the convergence reconciler (spec.md §4.H step 4).
    #[serde(default)]
    pub raw_job_status: String,
    pub jobid: i64,
    pub command: String,
}

crate::builder! {
    pub struct StepDescriptionBuilder => StepDescription {
        into {
            name: String = "compute",
            command: String = "echo hello",
        }
        set {
            session_id: SessionId = SessionId::new(),
        }
        option {
            service_id: ServiceId = None,
        }
        computed {
            id: StepDescriptionId = StepDescriptionId::new(),
        }
    }
}

crate::builder! {
    pub struct StepInstanceBuilder => StepInstance {
        into {
            instance_name: String = "demo-user-demo-session-compute_1",
            progress: String = "",
            raw_job_status: String = "",
            command: String = "echo hello",
        }
        set {
            step_description_id: StepDescriptionId = StepDescriptionId::new(),
            start_ts: u64 = 1_000_000,
            status: StepInstanceStatus = StepInstanceStatus::Starting,
            jobid: i64 = crate::service::NO_JOBID,
        }
        option {
            stop_ts: u64 = None,
        }
        computed {
            id: StepInstanceId = StepInstanceId::new(),
        }
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
