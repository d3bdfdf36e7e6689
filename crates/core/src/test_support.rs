// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::service::{ServiceKind, ServiceStatus};
    use crate::session::SessionStatus;
    use crate::step::StepInstanceStatus;
    use proptest::prelude::*;

    pub fn arb_session_status() -> impl Strategy<Value = SessionStatus> {
        prop_oneof![
            Just(SessionStatus::Starting),
            Just(SessionStatus::Active),
            Just(SessionStatus::Stopping),
            Just(SessionStatus::Stopped),
            Just(SessionStatus::Teardown),
            Just(SessionStatus::Unknown),
        ]
    }

    pub fn arb_service_kind() -> impl Strategy<Value = ServiceKind> {
        prop_oneof![
            Just(ServiceKind::Sbb),
            Just(ServiceKind::Gbf),
            Just(ServiceKind::Dasi),
            Just(ServiceKind::None),
        ]
    }

    pub fn arb_service_status() -> impl Strategy<Value = ServiceStatus> {
        prop_oneof![
            Just(ServiceStatus::Waiting),
            Just(ServiceStatus::StagingIn),
            Just(ServiceStatus::StagedIn),
            Just(ServiceStatus::Allocated),
            Just(ServiceStatus::StagingOut),
            Just(ServiceStatus::StagedOut),
            Just(ServiceStatus::Stopping),
            Just(ServiceStatus::Stopped),
            Just(ServiceStatus::Teardown),
            Just(ServiceStatus::Unknown),
        ]
    }

    /// Service statuses a step may legally be submitted against
    /// (spec.md §4.G.3 step 3: the service backing a step must be usable).
    pub fn arb_usable_service_status() -> impl Strategy<Value = ServiceStatus> {
        prop_oneof![Just(ServiceStatus::Allocated), Just(ServiceStatus::StagedIn)]
    }

    pub fn arb_step_instance_status() -> impl Strategy<Value = StepInstanceStatus> {
        prop_oneof![
            Just(StepInstanceStatus::Starting),
            Just(StepInstanceStatus::Running),
            Just(StepInstanceStatus::Stopping),
            Just(StepInstanceStatus::Stopped),
            Just(StepInstanceStatus::Suspended),
        ]
    }
}
