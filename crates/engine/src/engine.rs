// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Session Orchestrator's shared handle (spec.md §4.G): the Store plus
//! the two external capabilities every protocol coordinates. Generic over
//! both so tests run against the in-memory fakes and the daemon wires the
//! real implementations at startup (spec.md §9: "process-wide state is just
//! settings loaded at init").

use wfm_capabilities::{JobManager, ResourceManager};
use wfm_store::Store;

pub struct Engine<J: JobManager, R: ResourceManager> {
    pub(crate) store: Store,
    pub(crate) job_manager: J,
    pub(crate) resource_manager: R,
}

impl<J: JobManager + Clone, R: ResourceManager + Clone> Clone for Engine<J, R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            job_manager: self.job_manager.clone(),
            resource_manager: self.resource_manager.clone(),
        }
    }
}

impl<J: JobManager, R: ResourceManager> Engine<J, R> {
    pub fn new(store: Store, job_manager: J, resource_manager: R) -> Self {
        Self { store, job_manager, resource_manager }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Exposes the resource manager directly, for the location/flavor
    /// catalog endpoints (spec.md §11.1) which need no session context.
    pub fn resource_manager(&self) -> &R {
        &self.resource_manager
    }
}
