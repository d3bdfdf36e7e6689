// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step-progress update (spec.md §4.G.5): an external poke identifying the
//! step instance by jobid, persisting `progress` verbatim.

use wfm_capabilities::{JobManager, ResourceManager};
use wfm_core::WfmError;

use crate::engine::Engine;

pub struct StepProgressInput {
    pub jobid: i64,
    pub progress: String,
}

impl<J: JobManager, R: ResourceManager> Engine<J, R> {
    pub fn update_step_progress(&self, input: StepProgressInput) -> Result<String, WfmError> {
        let matches = self.store.get_step_instance_by_jobid(input.jobid);
        let instance = match matches.as_slice() {
            [single] => single,
            [] => return Err(WfmError::state(format!("no step instance found for jobid {}", input.jobid))),
            _ => {
                return Err(WfmError::state(format!(
                    "more than one step instance carries jobid {}",
                    input.jobid
                )))
            }
        };
        let updated = self.store.update_step_instance_progress(&instance.id, input.progress)?;
        Ok(updated.instance_name)
    }
}

#[cfg(test)]
#[path = "step_progress_tests.rs"]
mod tests;
