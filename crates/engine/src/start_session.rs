// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Start-session protocol (spec.md §4.G.1): validate, provision namespace
//! locks, start every service used by at least one step (rolling the whole
//! batch back on the first failure), and persist the resulting rows.

use std::collections::{HashMap, HashSet};

use wfm_capabilities::{ephemeral_service, JobManager, ResourceManager};
use wfm_core::{
    Service, ServiceStatus, Session, SessionId, SessionStatus, StepDescription, StepDescriptionId, WfmError,
};
use wfm_workflow::{name_resolver, substitution, validator};

use crate::engine::Engine;
use crate::service_build::build_service;
use crate::view::SessionDetailed;

pub struct StartSessionInput {
    pub workflow_file_name: String,
    pub workflow_text: String,
    pub session_name: String,
    pub user: String,
    pub cmdline_vars: HashMap<String, String>,
    pub sync_start: bool,
    pub now: u64,
}

impl<J: JobManager, R: ResourceManager> Engine<J, R> {
    /// Run the full start-session protocol. Either the session comes back
    /// ACTIVE (sync) or STARTING (async) with every used service persisted,
    /// or nothing is left behind: namespace locks and external reservations
    /// from this attempt are all released before the error surfaces.
    pub async fn start_session(&self, input: StartSessionInput) -> Result<SessionDetailed, WfmError> {
        if input.session_name.is_empty() || input.session_name.contains('/') {
            return Err(wfm_workflow::ValidationError::InvalidSessionName.into());
        }

        let predefined = substitution::predefined_vars(&input.session_name, &input.user);
        let vars = substitution::merge_cmdline_vars(&predefined, &input.cmdline_vars)?;
        let substituted = substitution::substitute(&input.workflow_text, &vars);

        let validated = validator::validate(&substituted, &input.workflow_file_name)?;
        let description = validated.description;
        let workflow_name = description.workflow.name.clone();

        if let Some(existing) = self.store.get_session_by_name(&input.user, &input.session_name) {
            if existing.workflow_name == workflow_name && !existing.status.is_terminal() {
                return Err(WfmError::state(format!(
                    "session '{}' already exists for workflow '{}' and user '{}'",
                    input.session_name, workflow_name, input.user
                )));
            }
        }

        let used: HashSet<&str> =
            description.steps.iter().flat_map(|s| s.services.iter().map(|r| r.name.as_str())).collect();

        let session_id = SessionId::new();
        let resolved_names: HashMap<String, String> = description
            .services
            .iter()
            .map(|d| (d.name.clone(), name_resolver::service_name(&input.user, &input.session_name, &d.name)))
            .collect();

        // spec.md §4.G.1 step 6: every declared service carrying a namespace
        // attribute is locked, whether or not any step actually uses it —
        // namespace protection is a property of declaration, not of use.
        let all_declared: Vec<(String, Service)> = description
            .services
            .iter()
            .map(|d| {
                let resolved = resolved_names.get(&d.name).cloned().unwrap_or_else(|| d.name.clone());
                (d.name.clone(), build_service(session_id, d, resolved, input.now))
            })
            .collect();

        let pending: Vec<(String, Service)> =
            all_declared.iter().filter(|(name, _)| used.contains(name.as_str())).cloned().collect();

        let wants: Vec<(String, String)> = all_declared
            .iter()
            .filter(|(_, s)| s.kind.namespaced() && s.has_namespace())
            .map(|(_, s)| (s.namespace.clone(), s.name.clone()))
            .collect();
        let all_namespaces: Vec<String> = wants.iter().map(|(ns, _)| ns.clone()).collect();

        self.store.try_acquire_namespaces(&wants).map_err(|e| match e {
            wfm_store::StoreError::NamespaceLocked(namespace, holder) => {
                WfmError::resource(format!("NS {namespace} already used by other services [{holder}]"))
            }
            other => other.into(),
        })?;

        let run_id = crate::run_id::build_run_id(&input.session_name, input.now);

        let mut started: Vec<(String, Service)> = Vec::with_capacity(pending.len());
        for (declared_name, svc) in pending {
            match self.start_one_service(&svc, &input.user, &workflow_name, &run_id, input.sync_start).await {
                Ok(started_svc) => started.push((declared_name, started_svc)),
                Err(err) => {
                    self.rollback_started(&started, &workflow_name, &run_id, input.sync_start).await;
                    self.store.release_namespaces_best_effort(&all_namespaces);
                    return Err(err);
                }
            }
        }

        let session = Session {
            id: session_id,
            name: input.session_name.clone(),
            workflow_name: workflow_name.clone(),
            user: input.user.clone(),
            start_ts: input.now,
            end_ts: None,
            status: SessionStatus::Starting,
        };
        self.store.create_session(session, input.now)?;

        for (_, svc) in &started {
            self.store.create_service(svc.clone(), input.now)?;
        }

        for step in &description.steps {
            let service_id = step
                .services
                .first()
                .and_then(|r| started.iter().find(|(name, _)| name == &r.name).map(|(_, s)| s.id));
            let step_description = StepDescription {
                id: StepDescriptionId::new(),
                session_id,
                service_id,
                name: step.name.clone(),
                command: step.command.clone(),
            };
            self.store.create_step_description(step_description, input.now)?;
        }

        if input.sync_start {
            self.store.update_session_status(&session_id, SessionStatus::Active)?;
        }

        self.session_detailed(&session_id)
    }

    pub(crate) fn session_detailed(&self, session_id: &SessionId) -> Result<SessionDetailed, WfmError> {
        let session = self
            .store
            .get_session(session_id)
            .ok_or_else(|| WfmError::state(format!("session {session_id} not found")))?;
        let services = self.store.list_services_for_session(session_id);
        let step_descriptions = self.store.list_step_descriptions_for_session(session_id);
        Ok(SessionDetailed { session, services, step_descriptions })
    }

    async fn start_one_service(
        &self,
        svc: &Service,
        user: &str,
        workflow: &str,
        run_id: &str,
        sync: bool,
    ) -> Result<Service, WfmError> {
        let capability = ephemeral_service::for_kind(svc.kind);
        let reservation = capability.fill_reservation(svc, user);
        self.resource_manager.reserve(&reservation).await.map_err(WfmError::from)?;

        let mut started = svc.clone();
        if sync {
            capability.start_sync(svc, workflow, run_id).await.map_err(WfmError::from)?;
            started.status = ServiceStatus::Allocated;
        } else {
            let jobid = capability.start_async(svc, workflow, run_id).await.map_err(WfmError::from)?;
            started.status = ServiceStatus::Waiting;
            started.jobid = jobid;
        }
        Ok(started)
    }

    /// Stop every already-started service in reverse order (spec.md §4.G.1:
    /// rollback on partial-start failure). Stop errors are logged, not
    /// propagated — the caller is already returning the original failure.
    async fn rollback_started(&self, started: &[(String, Service)], workflow: &str, run_id: &str, sync: bool) {
        for (_, svc) in started.iter().rev() {
            let capability = ephemeral_service::for_kind(svc.kind);
            let result = if sync {
                capability.stop_sync(&svc.name, svc.jobid, &svc.location, workflow, run_id).await.map(|_| ())
            } else {
                capability.stop_async(&svc.name, svc.jobid, &svc.location, workflow, run_id).await.map(|_| ())
            };
            if let Err(err) = result {
                tracing::warn!(service = %svc.name, %err, "rollback stop failed during start-session unwind");
            }
        }
    }
}

#[cfg(test)]
#[path = "start_session_tests.rs"]
mod tests;
