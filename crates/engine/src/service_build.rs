// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns a validated [`wfm_workflow::ServiceDecl`] plus its resolved
//! namespaced name into the typed [`wfm_core::Service`] row the Store and
//! the EphemeralService capability operate on (spec.md §4.G.1 steps 3-4).

use wfm_core::{Service, ServiceId, ServiceKind, ServiceStatus, SessionId, NO_JOBID};
use wfm_workflow::ServiceDecl;

pub fn service_kind(decl: &ServiceDecl) -> ServiceKind {
    match decl.kind.to_uppercase().as_str() {
        "SBB" => ServiceKind::Sbb,
        "GBF" => ServiceKind::Gbf,
        "DASI" => ServiceKind::Dasi,
        _ => ServiceKind::None,
    }
}

/// Build the (not-yet-started) Service row for a declared service, mapping
/// the untyped attribute dictionary onto its typed fields.
pub fn build_service(session_id: SessionId, decl: &ServiceDecl, resolved_name: String, start_ts: u64) -> Service {
    let kind = service_kind(decl);
    let attr = |key: &str| decl.attributes.get(key).cloned().unwrap_or_default();
    let datanodes = decl.attributes.get("datanodes").and_then(|v| v.parse().ok()).unwrap_or(1);
    Service {
        id: ServiceId::new(),
        session_id,
        name: resolved_name,
        kind,
        location: attr("location"),
        targets: attr("targets"),
        flavor: attr("flavor"),
        namespace: attr("namespace"),
        mountpoint: attr("mountpoint"),
        storagesize: attr("storagesize"),
        datanodes,
        start_ts,
        end_ts: None,
        status: ServiceStatus::Waiting,
        jobid: NO_JOBID,
    }
}

#[cfg(test)]
#[path = "service_build_tests.rs"]
mod tests;
