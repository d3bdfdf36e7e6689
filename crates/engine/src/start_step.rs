// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Start-step protocol (spec.md §4.G.3): resolve the step description,
//! require every service allocated, substitute `{{ STEP }}`/cmdline
//! variables, and dispatch through the owning service kind's "use" path.

use std::collections::HashMap;

use wfm_capabilities::{ephemeral_service, JobManager, ResourceManager};
use wfm_core::{SessionStatus, StepInstance, StepInstanceId, StepInstanceStatus, WfmError, NO_JOBID};
use wfm_workflow::{name_resolver, substitution};

use crate::engine::Engine;

pub struct StartStepInput {
    pub session_name: String,
    pub user: String,
    pub step_name: String,
    pub cmdline_vars: HashMap<String, String>,
    pub now: u64,
}

pub struct StartStepOutput {
    pub id: StepInstanceId,
    pub instance_name: String,
}

impl<J: JobManager, R: ResourceManager> Engine<J, R> {
    pub async fn start_step(&self, input: StartStepInput) -> Result<StartStepOutput, WfmError> {
        let session = self
            .store
            .get_session_by_name(&input.user, &input.session_name)
            .ok_or_else(|| WfmError::state(format!("session '{}' not found", input.session_name)))?;

        if session.status != SessionStatus::Active {
            let reconciled = self.reconcile_session(&session.id, input.now).await?;
            let still_active = reconciled.map(|d| d.session.status == SessionStatus::Active).unwrap_or(false);
            if !still_active {
                return Err(WfmError::state(format!("session '{}' is not ACTIVE", input.session_name)));
            }
        }

        let services = self.store.list_services_for_session(&session.id);
        if !services.iter().all(|s| s.status.is_usable()) {
            return Err(WfmError::state("some services are not allocated".to_string()));
        }

        let step_description = self
            .store
            .get_step_description_by_name(&session.id, &input.step_name)
            .ok_or_else(|| WfmError::state(format!("step '{}' not found", input.step_name)))?;

        let mut predefined = substitution::predefined_vars(&input.session_name, &input.user);
        predefined.insert("STEP".to_string(), input.step_name.clone());
        let vars = substitution::merge_cmdline_vars(&predefined, &input.cmdline_vars)?;
        let command = substitution::substitute(&step_description.command, &vars);
        substitution::ensure_no_residual(&command, &format!("step '{}' command", input.step_name))?;

        let index = self.store.count_step_instances(&step_description.id) + 1;
        let instance_name = name_resolver::step_instance_name(&input.user, &input.session_name, &input.step_name, index);
        let instance = StepInstance {
            id: StepInstanceId::new(),
            step_description_id: step_description.id,
            instance_name: instance_name.clone(),
            start_ts: input.now,
            stop_ts: None,
            status: StepInstanceStatus::Starting,
            progress: String::new(),
            jobid: NO_JOBID,
            command: command.clone(),
        };
        let instance = self.store.create_step_instance(instance, input.now)?;

        let service = step_description.service_id.and_then(|id| services.iter().find(|s| s.id == id).cloned());
        match self.submit_step(&instance.id, &command, service.as_ref()).await {
            Ok(jobid) => {
                self.store.set_step_instance_jobid(&instance.id, jobid)?;
                self.store.update_step_instance_status(&instance.id, StepInstanceStatus::Running)?;
                Ok(StartStepOutput { id: instance.id, instance_name })
            }
            Err(err) => {
                self.store.delete_step_instance(&instance.id, input.now)?;
                Err(err)
            }
        }
    }

    /// Build the batch-system options the backing service contributes,
    /// carry over the async-start dependency (spec.md §9), and submit
    /// (spec.md §4.G.3 step 7). Unlike [`EphemeralService::build_use_command`]
    /// (a human-pasteable shell line for interactive access), this passes
    /// each flag as its own argv token to the job manager.
    async fn submit_step(
        &self,
        _instance_id: &StepInstanceId,
        command: &str,
        service: Option<&wfm_core::Service>,
    ) -> Result<i64, WfmError> {
        let mut options = Vec::new();
        let mut envs = Vec::new();
        if let Some(svc) = service {
            let capability = ephemeral_service::for_kind(svc.kind);
            options.extend(capability.submit_options(&svc.name, &svc.location));
            envs = capability.submit_env();
            if svc.jobid >= 0 {
                options.push(format!("--dependency=afterany:{}", svc.jobid));
            }
        }
        options.push(command.to_string());
        self.job_manager.submit_line(&options, &envs).await.map_err(WfmError::from)
    }
}

#[cfg(test)]
#[path = "start_step_tests.rs"]
mod tests;
