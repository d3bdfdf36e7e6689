// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Convergence / Status Reconciler (spec.md §4.H): pulled on every read
//! path, never a background thread. Refreshes service status from the
//! EphemeralService capability, derives the session's status, and runs
//! session cleanup the moment a STOPPED session is observed.

use wfm_capabilities::{ephemeral_service, JobManager, ResourceManager};
use wfm_core::{Service, ServiceStatus, SessionId, SessionStatus, StepInstance, WfmError};

use crate::engine::Engine;
use crate::view::SessionDetailed;

impl<J: JobManager, R: ResourceManager> Engine<J, R> {
    /// Probe every service of a session and persist any status change
    /// (spec.md §4.H step 1). An unsupported kind or an UNKNOWN probe
    /// leaves the stored status untouched.
    pub(crate) async fn refresh_services_for_session(&self, session_id: &SessionId) -> Vec<Service> {
        let mut refreshed = Vec::new();
        for svc in self.store.list_services_for_session(session_id) {
            let probed = ephemeral_service::for_kind(svc.kind).probe_status(&svc.name).await;
            let updated = if probed == ServiceStatus::Unknown || probed == svc.status {
                svc
            } else {
                self.store.update_service_status(&svc.id, probed).unwrap_or(svc)
            };
            refreshed.push(updated);
        }
        refreshed
    }

    /// Derive a session's status from its services' current statuses
    /// (spec.md §4.H step 2). Returns `None` when none of the rules apply,
    /// meaning the stored status should be left alone.
    fn derive_session_status(current: SessionStatus, services: &[Service]) -> Option<SessionStatus> {
        if services.is_empty() {
            return match current {
                SessionStatus::Starting => Some(SessionStatus::Active),
                SessionStatus::Stopping => Some(SessionStatus::Stopped),
                _ => None,
            };
        }
        if services.iter().any(|s| s.status == ServiceStatus::Teardown) {
            return Some(SessionStatus::Teardown);
        }
        if current == SessionStatus::Starting && services.iter().all(|s| s.status.is_usable()) {
            return Some(SessionStatus::Active);
        }
        if current == SessionStatus::Stopping && services.iter().all(|s| s.status.is_stopped()) {
            return Some(SessionStatus::Stopped);
        }
        None
    }

    /// Run the reconciler for one session (spec.md §4.H steps 1-3). Returns
    /// `None` once the session has been cleaned up after reaching STOPPED
    /// — callers must omit it from whatever listing they're building.
    pub async fn reconcile_session(&self, session_id: &SessionId, now: u64) -> Result<Option<SessionDetailed>, WfmError> {
        let Some(session) = self.store.get_session(session_id) else { return Ok(None) };
        let services = self.refresh_services_for_session(session_id).await;

        if let Some(derived) = Self::derive_session_status(session.status, &services) {
            if derived != session.status {
                self.store.update_session_status(session_id, derived)?;
            }
            if derived == SessionStatus::Stopped {
                self.cleanup_session(session_id, now).await?;
                return Ok(None);
            }
        }

        let session = self.store.get_session(session_id).unwrap_or(session);
        let step_descriptions = self.store.list_step_descriptions_for_session(session_id);
        Ok(Some(SessionDetailed { session, services, step_descriptions }))
    }

    /// Reconcile and return every still-present session (spec.md §4.H,
    /// used by the all-sessions / all-detailed listings).
    pub async fn list_sessions_reconciled(&self, now: u64) -> Result<Vec<SessionDetailed>, WfmError> {
        let mut out = Vec::new();
        for session in self.store.list_sessions() {
            if let Some(detailed) = self.reconcile_session(&session.id, now).await? {
                out.push(detailed);
            }
        }
        Ok(out)
    }

    /// Refresh one StepInstance's raw job-manager status (spec.md §4.H
    /// step 4): `raw_job_status` stores the raw, possibly blank-separated
    /// string verbatim; `status` is derived from the display-combined
    /// token. Never touches `progress` — that field belongs exclusively to
    /// the §4.G.5 external poke.
    pub async fn refresh_step_instance(&self, instance: &StepInstance) -> StepInstance {
        if instance.jobid < 0 {
            return instance.clone();
        }
        let raw = self.job_manager.get_job_state(instance.jobid).await;
        tracing::debug!(jobid = instance.jobid, status = %raw, "refreshed job state");
        let combined = self.job_manager.combine_for_display(&raw);
        let status = self.job_manager.translate_to_wfm_status(&combined);
        match self.store.update_step_instance_raw_status(&instance.id, raw) {
            Ok(updated) => self.store.update_step_instance_status(&instance.id, status).unwrap_or(updated),
            Err(_) => instance.clone(),
        }
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
