// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session CRUD and the `(name, workflow_name, user)` uniqueness constraint
//! (spec.md §5: a name may be reused once its prior session has STOPPED).

use crate::error::StoreError;
use crate::helpers::find_by_prefix;
use crate::state::Store;
use wfm_core::{Activity, ObjectType, Session, SessionId, SessionStatus};

impl Store {
    /// Create a session, rejecting the insert if a non-stopped session
    /// already occupies this `(name, workflow_name, user)` triple.
    pub fn create_session(&self, session: Session, now: u64) -> Result<Session, StoreError> {
        let mut state = self.inner.lock();
        let collision = state.sessions.values().any(|s| {
            s.name == session.name
                && s.workflow_name == session.workflow_name
                && s.user == session.user
                && !s.status.is_terminal()
        });
        if collision {
            return Err(StoreError::DuplicateSession {
                name: session.name.clone(),
                workflow: session.workflow_name.clone(),
                user: session.user.clone(),
            });
        }
        let id = session.id.to_string();
        state.sessions.insert(id.clone(), session.clone());
        state.record_activity(ObjectType::Session, id, Activity::Creation, now);
        Ok(session)
    }

    pub fn get_session(&self, id: &SessionId) -> Option<Session> {
        self.inner.lock().sessions.get(id.as_str()).cloned()
    }

    pub fn get_session_by_prefix(&self, id_or_prefix: &str) -> Option<Session> {
        find_by_prefix(&self.inner.lock().sessions, id_or_prefix).cloned()
    }

    /// Find a session by `(user, name)`, preferring the most recent
    /// non-stopped one (spec.md §4.G.4: access-session by name).
    pub fn get_session_by_name(&self, user: &str, name: &str) -> Option<Session> {
        let state = self.inner.lock();
        let mut candidates: Vec<&Session> =
            state.sessions.values().filter(|s| s.user == user && s.name == name).collect();
        candidates.sort_by_key(|s| s.start_ts);
        candidates
            .iter()
            .rev()
            .find(|s| !s.status.is_terminal())
            .or_else(|| candidates.last())
            .map(|s| (*s).clone())
    }

    pub fn list_sessions(&self) -> Vec<Session> {
        self.inner.lock().sessions.values().cloned().collect()
    }

    pub fn update_session_status(&self, id: &SessionId, status: SessionStatus) -> Result<Session, StoreError> {
        let mut state = self.inner.lock();
        let session = state
            .sessions
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::SessionNotFound(id.to_string()))?;
        session.status = status;
        Ok(session.clone())
    }

    pub fn set_session_end_ts(&self, id: &SessionId, end_ts: u64) -> Result<Session, StoreError> {
        let mut state = self.inner.lock();
        let session = state
            .sessions
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::SessionNotFound(id.to_string()))?;
        session.end_ts = Some(end_ts);
        Ok(session.clone())
    }

    /// Remove a STOPPED session's row so its `(name, workflow, user)` slot
    /// can be reused. Anything other than STOPPED is refused.
    pub fn delete_session(&self, id: &SessionId, now: u64) -> Result<(), StoreError> {
        let mut state = self.inner.lock();
        let session =
            state.sessions.get(id.as_str()).ok_or_else(|| StoreError::SessionNotFound(id.to_string()))?;
        if session.status != SessionStatus::Stopped {
            return Err(StoreError::SessionNotStopped(id.to_string()));
        }
        state.sessions.shift_remove(id.as_str());
        state.record_activity(ObjectType::Session, id.to_string(), Activity::Removal, now);
        Ok(())
    }
}

#[cfg(test)]
#[path = "sessions_tests.rs"]
mod tests;
