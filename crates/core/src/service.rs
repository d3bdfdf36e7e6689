// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ephemeral service identifier, kind and lifecycle status.

use crate::session::SessionId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a provisioned service.
    pub struct ServiceId("srv-");
}

/// jobid sentinel meaning "no async start was performed, no dependency needed".
pub const NO_JOBID: i64 = -1;

/// Kind of ephemeral storage service (spec.md §3, §4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceKind {
    /// Slurm burst buffer.
    Sbb,
    /// NFS-over-Ganesha backend ("GBF" in the original job-manager vocabulary).
    #[serde(rename = "GBF")]
    Gbf,
    /// DASI data store (a GBF variant with a config-file-derived root).
    Dasi,
    /// No ephemeral service: steps run directly through the job manager.
    None,
}

crate::simple_display! {
    ServiceKind {
        Sbb => "SBB",
        Gbf => "GBF",
        Dasi => "DASI",
        None => "NONE",
    }
}

impl ServiceKind {
    /// GBF/DASI services are limited to a single data node (spec.md §4.C).
    pub fn single_datanode_only(&self) -> bool {
        matches!(self, ServiceKind::Gbf | ServiceKind::Dasi)
    }

    /// Whether this kind ever carries a `namespace` attribute subject to
    /// namespace-lock exclusivity.
    pub fn namespaced(&self) -> bool {
        matches!(self, ServiceKind::Gbf | ServiceKind::Dasi)
    }
}

/// Status of a service in its lifecycle (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Waiting,
    StagingIn,
    StagedIn,
    Allocated,
    StagingOut,
    StagedOut,
    Stopping,
    Stopped,
    Teardown,
    Unknown,
}

impl ServiceStatus {
    /// Service is ready to back a step (spec.md §4.G.3 step 3).
    pub fn is_usable(&self) -> bool {
        matches!(self, ServiceStatus::Allocated | ServiceStatus::StagedIn)
    }

    /// Service has finished tearing down (spec.md §4.H.2).
    pub fn is_stopped(&self) -> bool {
        matches!(self, ServiceStatus::Stopped | ServiceStatus::StagedOut)
    }

    /// Service is a candidate for the stop protocol (spec.md §4.G.2 step 6).
    pub fn is_stoppable(&self) -> bool {
        matches!(self, ServiceStatus::Allocated | ServiceStatus::StagedIn | ServiceStatus::Waiting)
    }
}

crate::simple_display! {
    ServiceStatus {
        Waiting => "waiting",
        StagingIn => "staging_in",
        StagedIn => "staged_in",
        Allocated => "allocated",
        StagingOut => "staging_out",
        StagedOut => "staged_out",
        Stopping => "stopping",
        Stopped => "stopped",
        Teardown => "teardown",
        Unknown => "unknown",
    }
}

/// A service row (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub session_id: SessionId,
    /// Namespaced name: `{user}-{session}-{declared}`.
    pub name: String,
    pub kind: ServiceKind,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub targets: String,
    #[serde(default)]
    pub flavor: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub mountpoint: String,
    #[serde(default)]
    pub storagesize: String,
    #[serde(default = "default_datanodes")]
    pub datanodes: u32,
    pub start_ts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_ts: Option<u64>,
    pub status: ServiceStatus,
    /// Job that created this service. `NO_JOBID` (-1) means the start was
    /// synchronous and step submissions need not depend on it.
    pub jobid: i64,
}

fn default_datanodes() -> u32 {
    1
}

impl Service {
    pub fn has_namespace(&self) -> bool {
        !self.namespace.is_empty()
    }
}

crate::builder! {
    pub struct ServiceBuilder => Service {
        into {
            name: String = "demo-user-demo-session-scratch",
            location: String = "",
            targets: String = "",
            flavor: String = "",
            namespace: String = "",
            mountpoint: String = "",
            storagesize: String = "",
        }
        set {
            session_id: SessionId = SessionId::new(),
            kind: ServiceKind = ServiceKind::Sbb,
            datanodes: u32 = 1,
            start_ts: u64 = 1_000_000,
            status: ServiceStatus = ServiceStatus::Waiting,
            jobid: i64 = NO_JOBID,
        }
        option {
            end_ts: u64 = None,
        }
        computed {
            id: ServiceId = ServiceId::new(),
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
