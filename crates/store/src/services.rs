// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ephemeral service CRUD (spec.md §4.A, §4.C).

use crate::error::StoreError;
use crate::helpers::find_by_prefix;
use crate::state::Store;
use wfm_core::{Activity, ObjectType, Service, ServiceId, ServiceStatus, SessionId};

impl Store {
    pub fn create_service(&self, service: Service, now: u64) -> Result<Service, StoreError> {
        let mut state = self.inner.lock();
        if !state.sessions.contains_key(service.session_id.as_str()) {
            return Err(StoreError::SessionNotFound(service.session_id.to_string()));
        }
        let id = service.id.to_string();
        state.services.insert(id.clone(), service.clone());
        state.record_activity(ObjectType::Service, id, Activity::Creation, now);
        Ok(service)
    }

    pub fn get_service(&self, id: &ServiceId) -> Option<Service> {
        self.inner.lock().services.get(id.as_str()).cloned()
    }

    pub fn get_service_by_prefix(&self, id_or_prefix: &str) -> Option<Service> {
        find_by_prefix(&self.inner.lock().services, id_or_prefix).cloned()
    }

    pub fn get_service_by_name(&self, session_id: &SessionId, name: &str) -> Option<Service> {
        self.inner
            .lock()
            .services
            .values()
            .find(|s| s.session_id == *session_id && s.name == name)
            .cloned()
    }

    pub fn list_services_for_session(&self, session_id: &SessionId) -> Vec<Service> {
        self.inner.lock().services.values().filter(|s| s.session_id == *session_id).cloned().collect()
    }

    pub fn update_service_status(&self, id: &ServiceId, status: ServiceStatus) -> Result<Service, StoreError> {
        let mut state = self.inner.lock();
        let service =
            state.services.get_mut(id.as_str()).ok_or_else(|| StoreError::ServiceNotFound(id.to_string()))?;
        service.status = status;
        Ok(service.clone())
    }

    pub fn update_service_jobid(&self, id: &ServiceId, jobid: i64) -> Result<Service, StoreError> {
        let mut state = self.inner.lock();
        let service =
            state.services.get_mut(id.as_str()).ok_or_else(|| StoreError::ServiceNotFound(id.to_string()))?;
        service.jobid = jobid;
        Ok(service.clone())
    }

    /// Fill in attributes discovered only after the service actually starts
    /// (namespace/mountpoint for DASI, the reservation's resolved flavor, ...).
    pub fn fill_service_attributes(
        &self,
        id: &ServiceId,
        namespace: Option<String>,
        mountpoint: Option<String>,
    ) -> Result<Service, StoreError> {
        let mut state = self.inner.lock();
        let service =
            state.services.get_mut(id.as_str()).ok_or_else(|| StoreError::ServiceNotFound(id.to_string()))?;
        if let Some(ns) = namespace {
            service.namespace = ns;
        }
        if let Some(mp) = mountpoint {
            service.mountpoint = mp;
        }
        Ok(service.clone())
    }

    pub fn set_service_end_ts(&self, id: &ServiceId, end_ts: u64) -> Result<Service, StoreError> {
        let mut state = self.inner.lock();
        let service =
            state.services.get_mut(id.as_str()).ok_or_else(|| StoreError::ServiceNotFound(id.to_string()))?;
        service.end_ts = Some(end_ts);
        Ok(service.clone())
    }

    pub fn delete_service(&self, id: &ServiceId, now: u64) -> Result<(), StoreError> {
        let mut state = self.inner.lock();
        state
            .services
            .shift_remove(id.as_str())
            .ok_or_else(|| StoreError::ServiceNotFound(id.to_string()))?;
        state.record_activity(ObjectType::Service, id.to_string(), Activity::Removal, now);
        Ok(())
    }
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod tests;
