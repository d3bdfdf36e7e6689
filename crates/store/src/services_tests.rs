// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use wfm_core::{Service, ServiceStatus, Session};

fn seeded_session(store: &Store) -> wfm_core::Session {
    store.create_session(Session::builder().build(), 1).unwrap()
}

#[test]
fn create_requires_existing_session() {
    let store = Store::new();
    let service = Service::builder().build();
    let err = store.create_service(service, 1).unwrap_err();
    assert!(matches!(err, StoreError::SessionNotFound(_)));
}

#[test]
fn create_and_list_for_session() {
    let store = Store::new();
    let session = seeded_session(&store);
    let service = Service::builder().session_id(session.id).name("scratch").build();
    store.create_service(service, 2).unwrap();
    let services = store.list_services_for_session(&session.id);
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].name, "scratch");
    assert!(store.activity_log().iter().any(|e| e.object_type == wfm_core::ObjectType::Service));
}

#[test]
fn update_status_round_trips() {
    let store = Store::new();
    let session = seeded_session(&store);
    let service = Service::builder().session_id(session.id).build();
    let service = store.create_service(service, 2).unwrap();
    let updated = store.update_service_status(&service.id, ServiceStatus::Allocated).unwrap();
    assert!(updated.status.is_usable());
}

#[test]
fn delete_emits_removal_activity() {
    let store = Store::new();
    let session = seeded_session(&store);
    let service = Service::builder().session_id(session.id).build();
    let service = store.create_service(service, 2).unwrap();
    store.delete_service(&service.id, 3).unwrap();
    assert!(store.get_service(&service.id).is_none());
    assert!(store.activity_log().iter().any(|e| e.activity == wfm_core::Activity::Removal));
}
