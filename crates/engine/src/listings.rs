// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-path query surface the daemon's HTTP handlers call directly
//! (spec.md §6 `/session/*`, `/step/*`): every listing runs through the
//! reconciler first (spec.md §4.H).

use wfm_capabilities::{JobManager, ResourceManager};
use wfm_core::{StepInstance, WfmError};

use crate::engine::Engine;
use crate::view::SessionDetailed;

pub struct StepStatus {
    pub instance: StepInstance,
    pub display_status: String,
}

impl<J: JobManager, R: ResourceManager> Engine<J, R> {
    /// `GET /session/all` / `/session/alldetailed` (spec.md §6).
    pub async fn list_all_sessions(&self, now: u64) -> Result<Vec<SessionDetailed>, WfmError> {
        self.list_sessions_reconciled(now).await
    }

    /// `GET /session/{name}` (spec.md §6): by name alone, which — per
    /// spec.md §9's session-name-scoping open question — may legitimately
    /// match more than one row across different users/workflows, so every
    /// match belonging to `user` is returned.
    pub async fn get_session_by_name(&self, user: &str, name: &str, now: u64) -> Result<Option<SessionDetailed>, WfmError> {
        let Some(session) = self.store.get_session_by_name(user, name) else { return Ok(None) };
        self.reconcile_session(&session.id, now).await
    }

    /// `GET /step/status/{session}[/{step}]` (spec.md §6, §4.H step 4):
    /// refreshes every instance's raw job-manager status, then reports the
    /// display-combined token.
    pub async fn step_status(
        &self,
        user: &str,
        session_name: &str,
        step_name: Option<&str>,
    ) -> Result<Vec<StepStatus>, WfmError> {
        let session = self
            .store
            .get_session_by_name(user, session_name)
            .ok_or_else(|| WfmError::state(format!("session '{session_name}' not found")))?;

        let mut out = Vec::new();
        for sd in self.store.list_step_descriptions_for_session(&session.id) {
            if let Some(name) = step_name {
                if sd.name != name {
                    continue;
                }
            }
            for instance in self.store.list_step_instances_for_description(&sd.id) {
                let refreshed = self.refresh_step_instance(&instance).await;
                let display_status = self.job_manager.combine_for_display(&refreshed.raw_job_status);
                out.push(StepStatus { instance: refreshed, display_status });
            }
        }
        Ok(out)
    }

    /// `GET /step/description/all` and `/step/description/{name}`.
    pub fn step_descriptions(&self, session_id: &wfm_core::SessionId) -> Vec<wfm_core::StepDescription> {
        self.store.list_step_descriptions_for_session(session_id)
    }
}
