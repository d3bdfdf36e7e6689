// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route table for the HTTP surface (spec.md §6): thin handlers that
//! translate wire DTOs into engine inputs and back. Validation and
//! orchestration live in `wfm-workflow`/`wfm-engine` (spec.md §2 component
//! I: "Thin").

mod resources;
mod services;
mod sessions;
mod steps;

use axum::routing::{get, post};
use axum::Router;
use wfm_capabilities::{JobManager, ResourceManager};

use crate::state::AppState;

pub fn build_router<J, R>(state: AppState<J, R>) -> Router
where
    J: JobManager + Clone + 'static,
    R: ResourceManager + Clone + 'static,
{
    Router::new()
        .route("/session/startup", post(sessions::startup))
        .route("/session/stop", post(sessions::stop))
        .route("/session/forcedstop", post(sessions::forced_stop))
        .route("/session/access", post(sessions::access))
        .route("/session/all", get(sessions::list_all))
        .route("/session/alldetailed", get(sessions::list_all_detailed))
        .route("/session/:name", get(sessions::get_by_name))
        .route("/step/startup", post(steps::startup))
        .route("/step/progress/job", post(steps::progress))
        .route("/step/status/:session", get(steps::status_for_session))
        .route("/step/status/:session/:step", get(steps::status_for_step))
        .route("/step/description/all", get(steps::descriptions_all))
        .route("/step/description/:name", get(steps::description_by_name))
        .route("/resource/locations", get(resources::locations))
        .route("/resource/flavors", get(resources::flavors))
        .route("/service/all", get(services::list_all))
        .route("/service/:name", get(services::get_by_name))
        .with_state(state)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
