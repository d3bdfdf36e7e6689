// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/session/*` handlers (spec.md §6).

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use wfm_capabilities::{JobManager, ResourceManager};
use wfm_core::{Clock, SystemClock};
use wfm_engine::{AccessInput, StartSessionInput, StopSessionInput};
use wfm_wire::{
    AccessRequest, ServiceSummary, SessionDetailedView, SessionSummary, StartSessionRequest,
    StepDescriptionSummary, StopSessionRequest,
};

use crate::error::ApiError;
use crate::state::AppState;

fn to_detailed_view(detailed: &wfm_engine::SessionDetailed) -> SessionDetailedView {
    SessionDetailedView {
        session: SessionSummary::from(&detailed.session),
        services: detailed.services.iter().map(ServiceSummary::from).collect(),
        step_descriptions: detailed.step_descriptions.iter().map(StepDescriptionSummary::from).collect(),
    }
}

/// `POST /session/startup` (spec.md §4.G.1, §6).
pub async fn startup<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<SessionDetailedView>, ApiError> {
    let detailed = state
        .engine
        .start_session(StartSessionInput {
            workflow_file_name: req.workflow_description_file,
            workflow_text: req.workflow_description,
            session_name: req.session_name,
            user: req.user_name,
            cmdline_vars: req.replacements,
            sync_start: req.sync_start,
            now: SystemClock.epoch_ms(),
        })
        .await?;
    Ok(Json(to_detailed_view(&detailed)))
}

async fn stop_with_force<J: JobManager + Clone, R: ResourceManager + Clone>(
    state: AppState<J, R>,
    req: StopSessionRequest,
    force: bool,
) -> Result<Json<u32>, ApiError> {
    state
        .engine
        .stop_session(StopSessionInput {
            session_name: req.session_name,
            user: req.user_name,
            force,
            sync_stop: req.sync_stop,
            now: SystemClock.epoch_ms(),
        })
        .await?;
    Ok(Json(0))
}

/// `POST /session/stop` (spec.md §4.G.2, §6): graceful stop.
pub async fn stop<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
    Json(req): Json<StopSessionRequest>,
) -> Result<Json<u32>, ApiError> {
    stop_with_force(state, req, false).await
}

/// `POST /session/forcedstop` (spec.md §4.G.2, §6): same shape, `force=true`.
pub async fn forced_stop<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
    Json(req): Json<StopSessionRequest>,
) -> Result<Json<u32>, ApiError> {
    stop_with_force(state, req, true).await
}

/// `POST /session/access` (spec.md §4.G.4, §6).
pub async fn access<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
    Json(req): Json<AccessRequest>,
) -> Result<Json<String>, ApiError> {
    let command = state
        .engine
        .access_session(AccessInput { session_name: req.session_name, user: req.user_name, services: req.services })
        .await?;
    Ok(Json(command))
}

/// `GET /session/all` (spec.md §6).
pub async fn list_all<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    let sessions = state.engine.list_all_sessions(SystemClock.epoch_ms()).await?;
    Ok(Json(sessions.iter().map(|d| SessionSummary::from(&d.session)).collect()))
}

/// `GET /session/alldetailed` (spec.md §6).
pub async fn list_all_detailed<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
) -> Result<Json<Vec<SessionDetailedView>>, ApiError> {
    let sessions = state.engine.list_all_sessions(SystemClock.epoch_ms()).await?;
    Ok(Json(sessions.iter().map(to_detailed_view).collect()))
}

/// `GET /session/{name}?user_name=...` (spec.md §6): singleton array, since
/// session-name-scoping (spec.md §9) only disambiguates once `user_name` is
/// given.
pub async fn get_by_name<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    let user = params.get("user_name").cloned().unwrap_or_default();
    let found = state.engine.get_session_by_name(&user, &name, SystemClock.epoch_ms()).await?;
    Ok(Json(found.iter().map(|d| SessionSummary::from(&d.session)).collect()))
}
