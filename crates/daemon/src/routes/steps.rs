// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/step/*` handlers (spec.md §6).

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use wfm_capabilities::{JobManager, ResourceManager};
use wfm_core::{Clock, SystemClock, WfmError};
use wfm_engine::{StartStepInput, StepProgressInput};
use wfm_wire::{
    StartStepRequest, StartStepResponse, StepDescriptionSummary, StepProgressRequest, StepStatusSummary,
};

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /step/startup` (spec.md §4.G.3, §6).
pub async fn startup<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
    Json(req): Json<StartStepRequest>,
) -> Result<Json<StartStepResponse>, ApiError> {
    let output = state
        .engine
        .start_step(StartStepInput {
            session_name: req.session_name,
            user: req.user_name,
            step_name: req.step_name,
            cmdline_vars: req.replacements,
            now: SystemClock.epoch_ms(),
        })
        .await?;
    Ok(Json(StartStepResponse { id: output.id.to_string(), instance_name: output.instance_name }))
}

/// `POST /step/progress/job` (spec.md §4.G.5, §6).
pub async fn progress<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
    Json(req): Json<StepProgressRequest>,
) -> Result<Json<String>, ApiError> {
    let instance_name =
        state.engine.update_step_progress(StepProgressInput { jobid: req.jobid, progress: req.progress })?;
    Ok(Json(instance_name))
}

/// `GET /step/status/{session}?user_name=...` (spec.md §4.H step 4, §6).
pub async fn status_for_session<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
    Path(session): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<StepStatusSummary>>, ApiError> {
    status_for(state, session, None, params).await
}

/// `GET /step/status/{session}/{step}?user_name=...`.
pub async fn status_for_step<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
    Path((session, step)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<StepStatusSummary>>, ApiError> {
    status_for(state, session, Some(step), params).await
}

async fn status_for<J: JobManager + Clone, R: ResourceManager + Clone>(
    state: AppState<J, R>,
    session: String,
    step: Option<String>,
    params: HashMap<String, String>,
) -> Result<Json<Vec<StepStatusSummary>>, ApiError> {
    let user = params.get("user_name").cloned().unwrap_or_default();
    let statuses = state.engine.step_status(&user, &session, step.as_deref()).await?;
    Ok(Json(
        statuses
            .iter()
            .map(|s| StepStatusSummary {
                instance: (&s.instance).into(),
                display_status: s.display_status.clone(),
            })
            .collect(),
    ))
}

fn session_for<J: JobManager, R: ResourceManager>(
    state: &AppState<J, R>,
    user: &str,
    name: &str,
) -> Result<wfm_core::Session, ApiError> {
    state
        .engine
        .store()
        .get_session_by_name(user, name)
        .ok_or_else(|| ApiError(WfmError::state(format!("session '{name}' not found"))))
}

/// `GET /step/description/all?session_name=...&user_name=...` (spec.md §6).
pub async fn descriptions_all<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<StepDescriptionSummary>>, ApiError> {
    let user = params.get("user_name").cloned().unwrap_or_default();
    let session_name = params.get("session_name").cloned().unwrap_or_default();
    let session = session_for(&state, &user, &session_name)?;
    let descriptions = state.engine.step_descriptions(&session.id);
    Ok(Json(descriptions.iter().map(StepDescriptionSummary::from).collect()))
}

/// `GET /step/description/{name}?session_name=...&user_name=...`: the one
/// step description matching `name` within that session.
pub async fn description_by_name<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<StepDescriptionSummary>>, ApiError> {
    let user = params.get("user_name").cloned().unwrap_or_default();
    let session_name = params.get("session_name").cloned().unwrap_or_default();
    let session = session_for(&state, &user, &session_name)?;
    let descriptions = state.engine.step_descriptions(&session.id);
    Ok(Json(descriptions.iter().filter(|d| d.name == name).map(StepDescriptionSummary::from).collect()))
}
