// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workflow-description tree (spec.md §4.E, §6): the shape a workflow
//! YAML document parses into, before validation rewrites service
//! references through the name resolver.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A parsed (not yet validated) workflow description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDescription {
    pub workflow: WorkflowHeader,
    pub services: Vec<ServiceDecl>,
    pub steps: Vec<StepDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowHeader {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: IndexMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDecl {
    pub name: String,
    pub command: String,
    pub services: Vec<StepServiceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepServiceRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datamovers: Option<String>,
}
