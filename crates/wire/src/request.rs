// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request bodies for the HTTP surface (spec.md §6).
//!
//! The spec's wire shapes for `/session/stop`, `/session/access` and
//! `/step/startup` don't name a user field explicitly, but every Store
//! lookup they drive is scoped to `(name, user, workflow)` (spec.md §3,
//! §9 "session-name scoping"). We carry `user_name` on every request that
//! resolves a session by name, matching `/session/startup`'s own shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// `POST /session/startup` (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub workflow_description_file: String,
    pub workflow_description: String,
    #[serde(default)]
    pub sync_start: bool,
    pub session_name: String,
    pub user_name: String,
    #[serde(default)]
    pub replacements: HashMap<String, String>,
}

/// `POST /session/stop` and `POST /session/forcedstop` (spec.md §6). The
/// `force` field is set by the daemon route for `/forcedstop`, not by the
/// client — the two endpoints share this body shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopSessionRequest {
    #[serde(default)]
    pub sync_stop: bool,
    pub session_name: String,
    pub user_name: String,
}

/// `POST /session/access` (spec.md §6). Empty `services` means "use all";
/// more than one entry is rejected (spec.md §4.G.4, §8 boundary behaviors).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    pub session_name: String,
    pub user_name: String,
    #[serde(default)]
    pub services: Vec<String>,
}

/// `POST /step/startup` (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartStepRequest {
    pub session_name: String,
    pub user_name: String,
    pub step_name: String,
    #[serde(default)]
    pub replacements: HashMap<String, String>,
}

/// `POST /step/progress/job` (spec.md §6, hidden `update` CLI command).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepProgressRequest {
    pub jobid: i64,
    pub progress: String,
}
