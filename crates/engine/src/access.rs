// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Access-session (spec.md §4.G.4): a shell command for interactive access
//! through the session's sole usable service.

use wfm_capabilities::{ephemeral_service, JobManager, ResourceManager};
use wfm_core::WfmError;

use crate::engine::Engine;

pub struct AccessInput {
    pub session_name: String,
    pub user: String,
    /// Empty means "use all" (which, combined with the single-candidate
    /// requirement, only ever makes sense when exactly one service
    /// exists); non-empty with more than one entry is rejected.
    pub services: Vec<String>,
}

impl<J: JobManager, R: ResourceManager> Engine<J, R> {
    pub async fn access_session(&self, input: AccessInput) -> Result<String, WfmError> {
        if input.services.len() > 1 {
            return Err(WfmError::validation("access accepts at most one service name".to_string()));
        }

        let session = self
            .store
            .get_session_by_name(&input.user, &input.session_name)
            .ok_or_else(|| WfmError::state(format!("session '{}' not found", input.session_name)))?;

        let services = self.refresh_services_for_session(&session.id).await;
        let candidates: Vec<_> = services
            .into_iter()
            .filter(|s| s.status.is_usable())
            .filter(|s| input.services.is_empty() || input.services.contains(&s.name))
            .collect();

        match candidates.as_slice() {
            [single] => {
                let capability = ephemeral_service::for_kind(single.kind);
                Ok(capability.build_use_command(&single.name, &single.location))
            }
            [] => Err(WfmError::state(format!(
                "session '{}' has no usable service to access",
                input.session_name
            ))),
            _ => Err(WfmError::state(format!(
                "session '{}' has more than one candidate service; name one explicitly",
                input.session_name
            ))),
        }
    }
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
