// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step description and step instance CRUD (spec.md §4.A, §4.F, §4.G.3).

use crate::error::StoreError;
use crate::helpers::find_by_prefix;
use crate::state::Store;
use wfm_core::{
    Activity, ObjectType, SessionId, StepDescription, StepDescriptionId, StepInstance, StepInstanceId,
    StepInstanceStatus,
};

impl Store {
    pub fn create_step_description(&self, step: StepDescription, now: u64) -> Result<StepDescription, StoreError> {
        let mut state = self.inner.lock();
        if !state.sessions.contains_key(step.session_id.as_str()) {
            return Err(StoreError::SessionNotFound(step.session_id.to_string()));
        }
        let collision = state
            .step_descriptions
            .values()
            .any(|d| d.session_id == step.session_id && d.name == step.name);
        if collision {
            return Err(StoreError::DuplicateStepDescription(step.name.clone()));
        }
        let id = step.id.to_string();
        state.step_descriptions.insert(id.clone(), step.clone());
        state.record_activity(ObjectType::StepDescription, id, Activity::Creation, now);
        Ok(step)
    }

    pub fn delete_step_description(&self, id: &StepDescriptionId, now: u64) -> Result<(), StoreError> {
        let mut state = self.inner.lock();
        state
            .step_descriptions
            .shift_remove(id.as_str())
            .ok_or_else(|| StoreError::StepDescriptionNotFound(id.to_string()))?;
        state.record_activity(ObjectType::StepDescription, id.to_string(), Activity::Removal, now);
        Ok(())
    }

    pub fn get_step_description(&self, id: &StepDescriptionId) -> Option<StepDescription> {
        self.inner.lock().step_descriptions.get(id.as_str()).cloned()
    }

    pub fn get_step_description_by_prefix(&self, id_or_prefix: &str) -> Option<StepDescription> {
        find_by_prefix(&self.inner.lock().step_descriptions, id_or_prefix).cloned()
    }

    pub fn get_step_description_by_name(&self, session_id: &SessionId, name: &str) -> Option<StepDescription> {
        self.inner
            .lock()
            .step_descriptions
            .values()
            .find(|d| d.session_id == *session_id && d.name == name)
            .cloned()
    }

    pub fn list_step_descriptions_for_session(&self, session_id: &SessionId) -> Vec<StepDescription> {
        self.inner
            .lock()
            .step_descriptions
            .values()
            .filter(|d| d.session_id == *session_id)
            .cloned()
            .collect()
    }

    /// Number of instances already created for this step description —
    /// the Name Resolver uses `count + 1` to form `{step}_{n}` (spec.md §4.F).
    pub fn count_step_instances(&self, step_description_id: &StepDescriptionId) -> u64 {
        self.inner
            .lock()
            .step_instances
            .values()
            .filter(|i| i.step_description_id == *step_description_id)
            .count() as u64
    }

    pub fn create_step_instance(&self, instance: StepInstance, now: u64) -> Result<StepInstance, StoreError> {
        let mut state = self.inner.lock();
        if !state.step_descriptions.contains_key(instance.step_description_id.as_str()) {
            return Err(StoreError::StepDescriptionNotFound(instance.step_description_id.to_string()));
        }
        let collision = state.step_instances.values().any(|i| i.instance_name == instance.instance_name);
        if collision {
            return Err(StoreError::DuplicateStepInstanceName(instance.instance_name.clone()));
        }
        let id = instance.id.to_string();
        state.step_instances.insert(id.clone(), instance.clone());
        state.record_activity(ObjectType::StepInstance, id, Activity::Creation, now);
        Ok(instance)
    }

    pub fn delete_step_instance(&self, id: &StepInstanceId, now: u64) -> Result<(), StoreError> {
        let mut state = self.inner.lock();
        state
            .step_instances
            .shift_remove(id.as_str())
            .ok_or_else(|| StoreError::StepInstanceNotFound(id.to_string()))?;
        state.record_activity(ObjectType::StepInstance, id.to_string(), Activity::Removal, now);
        Ok(())
    }

    /// Find the (unique) step instance carrying this job-manager jobid
    /// (spec.md §4.G.5: step-progress update resolves by jobid).
    pub fn get_step_instance_by_jobid(&self, jobid: i64) -> Vec<StepInstance> {
        self.inner.lock().step_instances.values().filter(|i| i.jobid == jobid).cloned().collect()
    }

    pub fn get_step_instance(&self, id: &StepInstanceId) -> Option<StepInstance> {
        self.inner.lock().step_instances.get(id.as_str()).cloned()
    }

    pub fn get_step_instance_by_prefix(&self, id_or_prefix: &str) -> Option<StepInstance> {
        find_by_prefix(&self.inner.lock().step_instances, id_or_prefix).cloned()
    }

    pub fn list_step_instances_for_description(&self, step_description_id: &StepDescriptionId) -> Vec<StepInstance> {
        self.inner
            .lock()
            .step_instances
            .values()
            .filter(|i| i.step_description_id == *step_description_id)
            .cloned()
            .collect()
    }

    pub fn update_step_instance_status(
        &self,
        id: &StepInstanceId,
        status: StepInstanceStatus,
    ) -> Result<StepInstance, StoreError> {
        let mut state = self.inner.lock();
        let instance = state
            .step_instances
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::StepInstanceNotFound(id.to_string()))?;
        instance.status = status;
        Ok(instance.clone())
    }

    /// Persist the externally-posted progress string verbatim (spec.md
    /// §4.G.5). Distinct from [`Store::update_step_instance_raw_status`]:
    /// the two fields are written by unrelated call paths.
    pub fn update_step_instance_progress(&self, id: &StepInstanceId, progress: String) -> Result<StepInstance, StoreError> {
        let mut state = self.inner.lock();
        let instance = state
            .step_instances
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::StepInstanceNotFound(id.to_string()))?;
        instance.progress = progress;
        Ok(instance.clone())
    }

    /// Overwrite the job manager's raw, possibly blank-separated status
    /// string (spec.md §4.H step 4). Never touches `progress`.
    pub fn update_step_instance_raw_status(&self, id: &StepInstanceId, raw_status: String) -> Result<StepInstance, StoreError> {
        let mut state = self.inner.lock();
        let instance = state
            .step_instances
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::StepInstanceNotFound(id.to_string()))?;
        instance.raw_job_status = raw_status;
        Ok(instance.clone())
    }

    pub fn set_step_instance_jobid(&self, id: &StepInstanceId, jobid: i64) -> Result<StepInstance, StoreError> {
        let mut state = self.inner.lock();
        let instance = state
            .step_instances
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::StepInstanceNotFound(id.to_string()))?;
        instance.jobid = jobid;
        Ok(instance.clone())
    }

    pub fn set_step_instance_stop_ts(&self, id: &StepInstanceId, stop_ts: u64) -> Result<StepInstance, StoreError> {
        let mut state = self.inner.lock();
        let instance = state
            .step_instances
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::StepInstanceNotFound(id.to_string()))?;
        instance.stop_ts = Some(stop_ts);
        Ok(instance.clone())
    }
}

#[cfg(test)]
#[path = "steps_tests.rs"]
mod tests;
