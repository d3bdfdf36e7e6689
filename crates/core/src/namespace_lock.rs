// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Namespace lock: a simple lease asserting exclusive use of a storage
//! namespace by one active or starting service (spec.md §3, §5).

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a namespace lock row.
    pub struct NamespaceLockId("nsl-");
}

/// A namespace lock row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceLock {
    pub id: NamespaceLockId,
    pub namespace: String,
    /// Name of the service holding the lock.
    pub service_name: String,
}

crate::builder! {
    pub struct NamespaceLockBuilder => NamespaceLock {
        into {
            namespace: String = "ns-0",
            service_name: String = "demo-user-demo-session-scratch",
        }
        computed {
            id: NamespaceLockId = NamespaceLockId::new(),
        }
    }
}

#[cfg(test)]
#[path = "namespace_lock_tests.rs"]
mod tests;
