// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::job_manager::fake::FakeJobManager;
use wfm_core::ServiceKind;

fn sample_request() -> ReservationRequest {
    let srv = Service::builder().kind(ServiceKind::Sbb).location("nodeA,nodeB").build();
    ReservationRequest::new(&srv, "alice", "SBB", serde_json::Map::new())
}

#[test]
fn reservation_request_splits_location_on_comma() {
    let req = sample_request();
    assert_eq!(req.location, vec!["nodeA".to_string(), "nodeB".to_string()]);
    assert_eq!(req.user_slurm_token, "MYTOKEN");
}

#[tokio::test]
async fn fake_resource_manager_admits_by_default() {
    let rm = FakeResourceManager::new();
    rm.reserve(&sample_request()).await.unwrap();
    assert_eq!(rm.reservations().len(), 1);
}

#[tokio::test]
async fn fake_resource_manager_can_be_told_to_refuse() {
    let rm = FakeResourceManager::new();
    rm.refuse_next("no capacity");
    let err = rm.reserve(&sample_request()).await.unwrap_err();
    assert!(matches!(err, ResourceManagerError::Refused(..)));
    assert!(rm.reservations().is_empty());
}

#[tokio::test]
async fn none_resource_manager_falls_back_to_job_manager_partitions() {
    let jm = FakeJobManager::new();
    jm.set_partitions(vec![crate::job_manager::Partition { name: "debug".into() }]);
    let rm = NoneResourceManager::new(jm);
    let locations = rm.list_locations().await.unwrap();
    assert_eq!(locations, vec![Location { name: "debug".into() }]);
    let flavors = rm.list_flavors().await.unwrap();
    assert_eq!(flavors, vec![Flavor { name: "debug".into() }]);
}

#[tokio::test]
async fn none_resource_manager_always_admits() {
    let jm = FakeJobManager::new();
    let rm = NoneResourceManager::new(jm);
    rm.reserve(&sample_request()).await.unwrap();
}
