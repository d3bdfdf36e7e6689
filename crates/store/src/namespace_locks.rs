// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Namespace lock acquisition (spec.md §4.A, §4.G.1 step: namespace locks
//! are acquired all-or-nothing before any service start is attempted).

use crate::error::StoreError;
use crate::state::Store;
use wfm_core::NamespaceLock;

impl Store {
    pub fn is_namespace_locked(&self, namespace: &str) -> bool {
        self.inner.lock().namespace_locks.contains_key(namespace)
    }

    /// Acquire every namespace in `wants` or none at all. On any collision
    /// the whole batch is refused and nothing is locked (spec.md §4.G.1:
    /// "if any namespace is already in use, the whole start is refused
    /// before any service is started").
    pub fn try_acquire_namespaces(&self, wants: &[(String, String)]) -> Result<Vec<NamespaceLock>, StoreError> {
        let mut state = self.inner.lock();
        for (namespace, _) in wants {
            if let Some(existing) = state.namespace_locks.get(namespace) {
                return Err(StoreError::NamespaceLocked(namespace.clone(), existing.service_name.clone()));
            }
        }
        let mut acquired = Vec::with_capacity(wants.len());
        for (namespace, service_name) in wants {
            let lock = NamespaceLock {
                id: wfm_core::NamespaceLockId::new(),
                namespace: namespace.clone(),
                service_name: service_name.clone(),
            };
            state.namespace_locks.insert(namespace.clone(), lock.clone());
            acquired.push(lock);
        }
        Ok(acquired)
    }

    pub fn release_namespace(&self, namespace: &str) -> Result<(), StoreError> {
        let mut state = self.inner.lock();
        state
            .namespace_locks
            .shift_remove(namespace)
            .map(|_| ())
            .ok_or_else(|| StoreError::NamespaceNotLocked(namespace.to_string()))
    }

    /// Release a batch without erroring on locks already gone — used by
    /// rollback paths where some releases may have already happened.
    pub fn release_namespaces_best_effort(&self, namespaces: &[String]) {
        let mut state = self.inner.lock();
        for namespace in namespaces {
            state.namespace_locks.shift_remove(namespace);
        }
    }

    pub fn list_namespace_locks(&self) -> Vec<NamespaceLock> {
        self.inner.lock().namespace_locks.values().cloned().collect()
    }
}

#[cfg(test)]
#[path = "namespace_locks_tests.rs"]
mod tests;
