// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/resource/*` handlers: the location/flavor catalog, falling back to
//! the job manager's partition list when no resource manager is
//! configured (spec.md §11.1).

use axum::extract::State;
use axum::Json;
use wfm_capabilities::{Flavor, JobManager, Location, ResourceManager};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /resource/locations`.
pub async fn locations<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
) -> Result<Json<Vec<Location>>, ApiError> {
    let locations = state.engine.resource_manager().list_locations().await.map_err(wfm_core::WfmError::from)?;
    Ok(Json(locations))
}

/// `GET /resource/flavors`.
pub async fn flavors<J: JobManager + Clone, R: ResourceManager + Clone>(
    State(state): State<AppState<J, R>>,
) -> Result<Json<Vec<Flavor>>, ApiError> {
    let flavors = state.engine.resource_manager().list_flavors().await.map_err(wfm_core::WfmError::from)?;
    Ok(Json(flavors))
}
