// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Response bodies for the HTTP surface (spec.md §6).
//!
//! Every summary is a thin, serializable projection of the matching
//! `wfm-core` entity: ids and status enums render as their `Display`
//! strings rather than the internal representation, so the CLI's
//! formatting (spec.md §1: out of scope here, but this is the shape it
//! consumes) never has to know about `IdBuf` or enum variants.

use serde::{Deserialize, Serialize};
use wfm_core::{Service, Session, StepDescription, StepInstance};

/// Error body returned with every non-200 response (spec.md §6, §7).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: String,
    pub name: String,
    pub workflow_name: String,
    pub user: String,
    pub start_ts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_ts: Option<u64>,
    pub status: String,
}

impl From<&Session> for SessionSummary {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            workflow_name: s.workflow_name.clone(),
            user: s.user.clone(),
            start_ts: s.start_ts,
            end_ts: s.end_ts,
            status: s.status.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceSummary {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub location: String,
    pub targets: String,
    pub flavor: String,
    pub namespace: String,
    pub mountpoint: String,
    pub storagesize: String,
    pub datanodes: u32,
    pub start_ts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_ts: Option<u64>,
    pub status: String,
    pub jobid: i64,
}

impl From<&Service> for ServiceSummary {
    fn from(s: &Service) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone(),
            kind: s.kind.to_string(),
            location: s.location.clone(),
            targets: s.targets.clone(),
            flavor: s.flavor.clone(),
            namespace: s.namespace.clone(),
            mountpoint: s.mountpoint.clone(),
            storagesize: s.storagesize.clone(),
            datanodes: s.datanodes,
            start_ts: s.start_ts,
            end_ts: s.end_ts,
            status: s.status.to_string(),
            jobid: s.jobid,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepDescriptionSummary {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    pub name: String,
    pub command: String,
}

impl From<&StepDescription> for StepDescriptionSummary {
    fn from(sd: &StepDescription) -> Self {
        Self {
            id: sd.id.to_string(),
            service_id: sd.service_id.map(|id| id.to_string()),
            name: sd.name.clone(),
            command: sd.command.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepInstanceSummary {
    pub id: String,
    pub step_description_id: String,
    pub instance_name: String,
    pub start_ts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_ts: Option<u64>,
    pub status: String,
    pub progress: String,
    pub jobid: i64,
    pub command: String,
}

impl From<&StepInstance> for StepInstanceSummary {
    fn from(i: &StepInstance) -> Self {
        Self {
            id: i.id.to_string(),
            step_description_id: i.step_description_id.to_string(),
            instance_name: i.instance_name.clone(),
            start_ts: i.start_ts,
            stop_ts: i.stop_ts,
            status: i.status.to_string(),
            progress: i.progress.clone(),
            jobid: i.jobid,
            command: i.command.clone(),
        }
    }
}

/// `GET /session/alldetailed` and the body of a successful `/session/startup`
/// (spec.md §6): a session together with its services and step
/// descriptions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionDetailedView {
    #[serde(flatten)]
    pub session: SessionSummary,
    pub services: Vec<ServiceSummary>,
    pub step_descriptions: Vec<StepDescriptionSummary>,
}

/// `GET /step/status/{session}[/{step}]` entry: the step instance plus the
/// job manager's display-combined status token (spec.md §4.H step 4).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepStatusSummary {
    #[serde(flatten)]
    pub instance: StepInstanceSummary,
    pub display_status: String,
}

/// `POST /step/startup` success body (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartStepResponse {
    pub id: String,
    pub instance_name: String,
}
