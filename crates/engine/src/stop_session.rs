// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stop-session protocol, graceful and forced (spec.md §4.G.2). A forced
//! stop additionally cancels outstanding step jobs before touching
//! services; service teardown itself is never forced.

use wfm_capabilities::{ephemeral_service, JobManager, ResourceManager};
use wfm_core::{ServiceStatus, SessionId, SessionStatus, StepInstanceStatus, WfmError};

use crate::engine::Engine;

pub struct StopSessionInput {
    pub session_name: String,
    pub user: String,
    pub force: bool,
    pub sync_stop: bool,
    pub now: u64,
}

impl<J: JobManager, R: ResourceManager> Engine<J, R> {
    pub async fn stop_session(&self, input: StopSessionInput) -> Result<(), WfmError> {
        let session = self
            .store
            .get_session_by_name(&input.user, &input.session_name)
            .ok_or_else(|| WfmError::state(format!("session '{}' not found", input.session_name)))?;

        if matches!(session.status, SessionStatus::Stopped | SessionStatus::Stopping) && !input.force {
            return Err(WfmError::state(format!(
                "session '{}' is already {}",
                input.session_name, session.status
            )));
        }

        self.store.update_session_status(&session.id, SessionStatus::Stopping)?;

        let mut not_stopped = 0usize;
        for sd in self.store.list_step_descriptions_for_session(&session.id) {
            for instance in self.store.list_step_instances_for_description(&sd.id) {
                if instance.jobid < 0 {
                    continue;
                }
                let raw = self.job_manager.get_job_state(instance.jobid).await;
                self.store.update_step_instance_raw_status(&instance.id, raw.clone())?;
                let stopping_combined = self.job_manager.combine_for_stopping(&raw);
                if stopping_combined == "STOPPED" {
                    self.store.update_step_instance_status(&instance.id, StepInstanceStatus::Stopped)?;
                } else if input.force {
                    self.job_manager.cancel(instance.jobid).await.map_err(WfmError::from)?;
                    self.store.update_step_instance_status(&instance.id, StepInstanceStatus::Stopping)?;
                } else {
                    not_stopped += 1;
                }
            }
        }

        if !input.force && not_stopped > 0 {
            self.store.update_session_status(&session.id, SessionStatus::Teardown)?;
            return Err(WfmError::state(format!("{not_stopped} steps not yet completed")));
        }

        let run_id = crate::run_id::build_run_id(&session.name, input.now);
        let services = self.refresh_services_for_session(&session.id).await;
        let mut any_service_failed = false;
        for svc in services {
            if !svc.status.is_stoppable() {
                continue;
            }
            self.store.update_service_status(&svc.id, ServiceStatus::Stopping)?;
            let capability = ephemeral_service::for_kind(svc.kind);
            if input.sync_stop {
                match capability.stop_sync(&svc.name, svc.jobid, &svc.location, &session.workflow_name, &run_id).await
                {
                    Ok(()) => {
                        self.store.update_service_status(&svc.id, ServiceStatus::Stopped)?;
                        self.store.set_service_end_ts(&svc.id, input.now)?;
                        if svc.has_namespace() {
                            self.store.release_namespaces_best_effort(std::slice::from_ref(&svc.namespace));
                        }
                    }
                    Err(err) => {
                        any_service_failed = true;
                        tracing::warn!(service = %svc.name, %err, "service stop failed");
                    }
                }
            } else {
                match capability
                    .stop_async(&svc.name, svc.jobid, &svc.location, &session.workflow_name, &run_id)
                    .await
                {
                    Ok(_jobid) => {}
                    Err(err) => {
                        any_service_failed = true;
                        tracing::warn!(service = %svc.name, %err, "service stop failed");
                    }
                }
            }
        }

        if input.sync_stop {
            if any_service_failed {
                self.store.update_session_status(&session.id, SessionStatus::Teardown)?;
                return Err(WfmError::external("one or more services failed to stop"));
            }
            self.cleanup_session(&session.id, input.now).await?;
        }
        // Async stop: session stays STOPPING; the reconciler cleans up once
        // it later observes every service stopped (spec.md §4.H step 3).

        Ok(())
    }

    /// Delete every dependent row of a session whose services have all
    /// stopped (spec.md §4.G.2 step 8, §4.H step 3).
    pub(crate) async fn cleanup_session(&self, session_id: &SessionId, now: u64) -> Result<(), WfmError> {
        for svc in self.store.list_services_for_session(session_id) {
            ephemeral_service::for_kind(svc.kind).cleanup_temp_files(&svc.name).await;
            self.store.delete_service(&svc.id, now)?;
        }
        for sd in self.store.list_step_descriptions_for_session(session_id) {
            for instance in self.store.list_step_instances_for_description(&sd.id) {
                self.store.delete_step_instance(&instance.id, now)?;
            }
            self.store.delete_step_description(&sd.id, now)?;
        }
        self.store.update_session_status(session_id, SessionStatus::Stopped)?;
        self.store.delete_session(session_id, now)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "stop_session_tests.rs"]
mod tests;
