// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/service/*` handlers: flattened service listings across sessions,
//! supplementing spec.md §6's session/step surface with the `status -A`
//! / `status -S` views the CLI's original implementation exposes.

use axum::extract::{Path, State};
use axum::Json;
use wfm_capabilities::{JobManager, ResourceManager};
use wfm_core::{Clock, SystemClock, WfmError};
use wfm_wire::ServiceSummary;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /service/all`: every service of every session, newest session
/// first as `list_all_sessions` returns them.
pub async fn list_all<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
) -> Result<Json<Vec<ServiceSummary>>, ApiError> {
    let sessions = state.engine.list_all_sessions(SystemClock.epoch_ms()).await?;
    Ok(Json(sessions.iter().flat_map(|d| d.services.iter()).map(ServiceSummary::from).collect()))
}

/// `GET /service/{name}`: service names are namespaced
/// `{user}-{session}-{declared}` (spec.md §4.F), so a bare name is unique
/// across the whole store.
pub async fn get_by_name<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
    Path(name): Path<String>,
) -> Result<Json<ServiceSummary>, ApiError> {
    let sessions = state.engine.list_all_sessions(SystemClock.epoch_ms()).await?;
    sessions
        .iter()
        .flat_map(|d| d.services.iter())
        .find(|s| s.name == name)
        .map(ServiceSummary::from)
        .map(Json)
        .ok_or_else(|| ApiError(WfmError::state(format!("service '{name}' not found"))))
}
