// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only audit trail emitted on every create/delete in the data model
//! (spec.md §3).

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for an activity log row.
    pub struct ActivityLogId("act-");
}

/// Kind of object an activity log entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Session,
    Service,
    StepDescription,
    StepInstance,
    NamespaceLock,
}

crate::simple_display! {
    ObjectType {
        Session => "session",
        Service => "service",
        StepDescription => "step_description",
        StepInstance => "step_instance",
        NamespaceLock => "namespace_lock",
    }
}

/// Kind of activity recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Creation,
    Removal,
}

crate::simple_display! {
    Activity {
        Creation => "creation",
        Removal => "removal",
    }
}

/// One row of the append-only activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: ActivityLogId,
    pub object_type: ObjectType,
    /// String form of the referenced object's id (object kinds use different id types).
    pub object_id: String,
    pub activity: Activity,
    pub ts: u64,
}

crate::builder! {
    pub struct ActivityLogEntryBuilder => ActivityLogEntry {
        into {
            object_id: String = "ses-00000000000000000",
        }
        set {
            object_type: ObjectType = ObjectType::Session,
            activity: Activity = Activity::Creation,
            ts: u64 = 1_000_000,
        }
        computed {
            id: ActivityLogId = ActivityLogId::new(),
        }
    }
}

#[cfg(test)]
#[path = "activity_log_tests.rs"]
mod tests;
