// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wfm-capabilities: the three external collaborators the engine talks to
//! through abstract contracts (spec.md §4.B, §4.C, §4.D) — JobManager,
//! EphemeralService and ResourceManager — plus their real and fake
//! implementations.

pub mod ephemeral_service;
pub mod job_manager;
pub mod resource_manager;

pub use ephemeral_service::{
    AttributeKeys, DasiService, EphemeralService, EphemeralServiceError, GbfService, NoneService,
    PendingService, SbbService,
};
pub use job_manager::{JobManager, JobManagerError, Partition, SlurmCommands, SlurmJobManager};
pub use resource_manager::{
    Flavor, HttpResourceManager, Location, NoneResourceManager, ReservationRequest, ResourceManager,
    ResourceManagerError,
};

#[cfg(any(test, feature = "test-support"))]
pub use job_manager::FakeJobManager;
#[cfg(any(test, feature = "test-support"))]
pub use resource_manager::FakeResourceManager;
