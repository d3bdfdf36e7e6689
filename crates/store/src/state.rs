// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized in-memory state behind the [`Store`] handle.
//!
//! Every mutating operation holds the single lock for its whole duration,
//! so a caller never observes a partially-applied uniqueness check. This
//! trades write concurrency for the simplicity of the all-or-nothing
//! invariants spec.md §5 actually requires (no operation here touches disk
//! or the network — those belong to the capability traits).

use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::Arc;
use wfm_core::{
    Activity, ActivityLogEntry, NamespaceLock, ObjectType, Service, Session, StepDescription,
    StepInstance,
};

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub(crate) sessions: IndexMap<String, Session>,
    pub(crate) services: IndexMap<String, Service>,
    pub(crate) step_descriptions: IndexMap<String, StepDescription>,
    pub(crate) step_instances: IndexMap<String, StepInstance>,
    /// Keyed by namespace, not lock id — exclusivity is on the namespace.
    pub(crate) namespace_locks: IndexMap<String, NamespaceLock>,
    pub(crate) activity_log: Vec<ActivityLogEntry>,
}

impl StoreState {
    pub(crate) fn record_activity(&mut self, object_type: ObjectType, object_id: String, activity: Activity, ts: u64) {
        self.activity_log.push(ActivityLogEntry {
            id: wfm_core::ActivityLogId::new(),
            object_type,
            object_id,
            activity,
            ts,
        });
    }
}

/// Handle to the materialized store (spec.md §4.A).
///
/// Cheap to clone: every clone shares the same underlying state, the way
/// the job-manager and ephemeral-service capabilities share their fakes
/// in test builds.
#[derive(Clone, Default)]
pub struct Store {
    pub(crate) inner: Arc<Mutex<StoreState>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full activity log, oldest first (spec.md §3: append-only audit trail).
    pub fn activity_log(&self) -> Vec<ActivityLogEntry> {
        self.inner.lock().activity_log.clone()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
