// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-wide state: the Session Orchestrator wired with the concrete
//! capabilities the settings describe (spec.md §9).

use async_trait::async_trait;
use wfm_capabilities::{
    Flavor, HttpResourceManager, Location, NoneResourceManager, ReservationRequest, ResourceManager,
    ResourceManagerError, SlurmJobManager,
};
use wfm_engine::Engine;
use wfm_store::Store;

use crate::settings::{ResourceManagerConfig, WfmSettings};

/// Dispatches to whichever resource manager the settings selected
/// (spec.md §4.D): a real one reached over HTTP, or the "NONE" fallback
/// that admits every reservation and defers catalogs to the job manager.
#[derive(Clone)]
pub enum ConfiguredResourceManager {
    Http(HttpResourceManager),
    None(NoneResourceManager<SlurmJobManager>),
}

#[async_trait]
impl ResourceManager for ConfiguredResourceManager {
    async fn reserve(&self, request: &ReservationRequest) -> Result<(), ResourceManagerError> {
        match self {
            Self::Http(rm) => rm.reserve(request).await,
            Self::None(rm) => rm.reserve(request).await,
        }
    }

    async fn list_locations(&self) -> Result<Vec<Location>, ResourceManagerError> {
        match self {
            Self::Http(rm) => rm.list_locations().await,
            Self::None(rm) => rm.list_locations().await,
        }
    }

    async fn list_flavors(&self) -> Result<Vec<Flavor>, ResourceManagerError> {
        match self {
            Self::Http(rm) => rm.list_flavors().await,
            Self::None(rm) => rm.list_flavors().await,
        }
    }
}

pub type WfmEngine = Engine<SlurmJobManager, ConfiguredResourceManager>;

/// Router state, generic over the capability implementations so route
/// handlers can be exercised against the in-memory fakes (spec.md §9).
/// Production wiring always instantiates `AppState<SlurmJobManager,
/// ConfiguredResourceManager>` via [`AppState::from_settings`].
#[derive(Clone)]
pub struct AppState<J: wfm_capabilities::JobManager, R: ResourceManager> {
    pub engine: Engine<J, R>,
}

impl AppState<SlurmJobManager, ConfiguredResourceManager> {
    pub fn from_settings(settings: &WfmSettings) -> Self {
        let job_manager = SlurmJobManager::new(settings.slurm_commands.clone());
        let resource_manager = match &settings.resource_manager {
            ResourceManagerConfig::Http { base_url } => {
                ConfiguredResourceManager::Http(HttpResourceManager::new(base_url.clone()))
            }
            ResourceManagerConfig::None => {
                ConfiguredResourceManager::None(NoneResourceManager::new(job_manager.clone()))
            }
        };
        Self { engine: Engine::new(Store::new(), job_manager, resource_manager) }
    }
}
