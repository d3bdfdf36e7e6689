// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ResourceManager capability (spec.md §4.D, §6): reservation
//! admission ahead of a service start, and the location/flavor catalog
//! (falling back to the job manager's partition list when no resource
//! manager is configured).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wfm_core::{Service, WfmError};

use crate::job_manager::JobManager;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResourceManagerError {
    #[error("reservation refused for '{0}': {1}")]
    Refused(String, String),
    #[error("resource manager request failed: {0}")]
    RequestFailed(String),
}

impl From<ResourceManagerError> for WfmError {
    fn from(err: ResourceManagerError) -> Self {
        match &err {
            ResourceManagerError::Refused(..) => WfmError::resource(err.to_string()),
            ResourceManagerError::RequestFailed(_) => WfmError::external(err.to_string()),
        }
    }
}

/// Reservation-request shape sent to the resource manager (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub name: String,
    pub user: String,
    pub user_slurm_token: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub servers: u32,
    pub location: Vec<String>,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl ReservationRequest {
    pub fn new(
        srv: &Service,
        user: &str,
        kind: &str,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            name: srv.name.clone(),
            user: user.to_string(),
            user_slurm_token: "MYTOKEN".to_string(),
            kind: kind.to_string(),
            servers: srv.datanodes,
            location: if srv.location.is_empty() {
                Vec::new()
            } else {
                srv.location.split(',').map(str::to_string).collect()
            },
            attributes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flavor {
    pub name: String,
}

/// Abstract contract for the resource manager (spec.md §4.D).
#[async_trait]
pub trait ResourceManager: Send + Sync {
    async fn reserve(&self, request: &ReservationRequest) -> Result<(), ResourceManagerError>;

    async fn list_locations(&self) -> Result<Vec<Location>, ResourceManagerError>;

    async fn list_flavors(&self) -> Result<Vec<Flavor>, ResourceManagerError>;
}

/// A real resource manager reached over HTTP.
#[derive(Clone)]
pub struct HttpResourceManager {
    client: reqwest::Client,
    base_url: String,
}

impl HttpResourceManager {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }
}

#[async_trait]
impl ResourceManager for HttpResourceManager {
    async fn reserve(&self, request: &ReservationRequest) -> Result<(), ResourceManagerError> {
        let resp = self
            .client
            .post(format!("{}/reserve", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| ResourceManagerError::RequestFailed(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let detail = resp.text().await.unwrap_or_default();
            Err(ResourceManagerError::Refused(request.name.clone(), detail))
        }
    }

    async fn list_locations(&self) -> Result<Vec<Location>, ResourceManagerError> {
        self.client
            .get(format!("{}/locations", self.base_url))
            .send()
            .await
            .map_err(|e| ResourceManagerError::RequestFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| ResourceManagerError::RequestFailed(e.to_string()))
    }

    async fn list_flavors(&self) -> Result<Vec<Flavor>, ResourceManagerError> {
        self.client
            .get(format!("{}/flavors", self.base_url))
            .send()
            .await
            .map_err(|e| ResourceManagerError::RequestFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| ResourceManagerError::RequestFailed(e.to_string()))
    }
}

/// "NONE" resource manager: every reservation is admitted, and the
/// location/flavor catalog falls back to the job manager's partitions
/// (spec.md §4.D).
#[derive(Clone)]
pub struct NoneResourceManager<J: JobManager> {
    job_manager: J,
}

impl<J: JobManager> NoneResourceManager<J> {
    pub fn new(job_manager: J) -> Self {
        Self { job_manager }
    }
}

#[async_trait]
impl<J: JobManager> ResourceManager for NoneResourceManager<J> {
    async fn reserve(&self, _request: &ReservationRequest) -> Result<(), ResourceManagerError> {
        Ok(())
    }

    async fn list_locations(&self) -> Result<Vec<Location>, ResourceManagerError> {
        let partitions = self
            .job_manager
            .list_partitions()
            .await
            .map_err(|e| ResourceManagerError::RequestFailed(e.to_string()))?;
        Ok(partitions.into_iter().map(|p| Location { name: p.name }).collect())
    }

    async fn list_flavors(&self) -> Result<Vec<Flavor>, ResourceManagerError> {
        let partitions = self
            .job_manager
            .list_partitions()
            .await
            .map_err(|e| ResourceManagerError::RequestFailed(e.to_string()))?;
        Ok(partitions.into_iter().map(|p| Flavor { name: p.name }).collect())
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct FakeState {
        refuse: Option<String>,
        refuse_named: Option<(String, String)>,
        reserved: Vec<ReservationRequest>,
        locations: Vec<Location>,
        flavors: Vec<Flavor>,
    }

    /// Fake resource manager for engine tests: admits every reservation
    /// unless told to refuse the next one, or a specific service name, by
    /// name.
    #[derive(Clone, Default)]
    pub struct FakeResourceManager {
        inner: Arc<Mutex<FakeState>>,
    }

    impl FakeResourceManager {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn refuse_next(&self, detail: impl Into<String>) {
            self.inner.lock().refuse = Some(detail.into());
        }

        /// Refuse only the reservation for `name`, whenever it arrives;
        /// earlier and later reservations for other names are admitted.
        /// Lets a test pin down which service fails in a multi-service
        /// start-session without depending on reservation order.
        pub fn refuse_service(&self, name: impl Into<String>, detail: impl Into<String>) {
            self.inner.lock().refuse_named = Some((name.into(), detail.into()));
        }

        pub fn reservations(&self) -> Vec<ReservationRequest> {
            self.inner.lock().reserved.clone()
        }
    }

    #[async_trait]
    impl ResourceManager for FakeResourceManager {
        async fn reserve(&self, request: &ReservationRequest) -> Result<(), ResourceManagerError> {
            let mut state = self.inner.lock();
            if state.refuse_named.as_ref().is_some_and(|(name, _)| name == &request.name) {
                if let Some((_, detail)) = state.refuse_named.take() {
                    return Err(ResourceManagerError::Refused(request.name.clone(), detail));
                }
            }
            if let Some(detail) = state.refuse.take() {
                return Err(ResourceManagerError::Refused(request.name.clone(), detail));
            }
            state.reserved.push(request.clone());
            Ok(())
        }

        async fn list_locations(&self) -> Result<Vec<Location>, ResourceManagerError> {
            Ok(self.inner.lock().locations.clone())
        }

        async fn list_flavors(&self) -> Result<Vec<Flavor>, ResourceManagerError> {
            Ok(self.inner.lock().flavors.clone())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeResourceManager;

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
