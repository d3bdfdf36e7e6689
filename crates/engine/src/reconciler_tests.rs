use std::collections::HashMap;

use wfm_capabilities::{FakeJobManager, FakeResourceManager};
use wfm_core::{ServiceStatus, SessionStatus, StepInstanceId, StepInstanceStatus};
use wfm_store::Store;

use super::*;
use crate::start_session::StartSessionInput;
use crate::stop_session::StopSessionInput;

const ONE_STEP: &str = r#"
workflow:
  name: demo-workflow
services:
  - name: scratch
    type: SBB
    attributes:
      flavor: gold
      targets: "server-a"
steps:
  - name: compute
    command: "echo {{ SESSION }}"
    services:
      - name: scratch
"#;

fn harness() -> Engine<FakeJobManager, FakeResourceManager> {
    Engine::new(Store::new(), FakeJobManager::new(), FakeResourceManager::new())
}

async fn started_async(engine: &Engine<FakeJobManager, FakeResourceManager>) -> SessionDetailed {
    engine
        .start_session(StartSessionInput {
            workflow_file_name: "demo.yaml".to_string(),
            workflow_text: ONE_STEP.to_string(),
            session_name: "s1".to_string(),
            user: "alice".to_string(),
            cmdline_vars: HashMap::new(),
            sync_start: false,
            now: 1_000,
        })
        .await
        .unwrap()
}

#[test]
fn derive_session_status_empty_services_starting_becomes_active() {
    let derived = Engine::<FakeJobManager, FakeResourceManager>::derive_session_status(SessionStatus::Starting, &[]);
    assert_eq!(derived, Some(SessionStatus::Active));
}

#[test]
fn derive_session_status_empty_services_stopping_becomes_stopped() {
    let derived = Engine::<FakeJobManager, FakeResourceManager>::derive_session_status(SessionStatus::Stopping, &[]);
    assert_eq!(derived, Some(SessionStatus::Stopped));
}

#[test]
fn derive_session_status_any_teardown_service_wins() {
    use wfm_core::ServiceBuilder;
    let services = vec![
        ServiceBuilder::default().status(ServiceStatus::Allocated).build(),
        ServiceBuilder::default().status(ServiceStatus::Teardown).build(),
    ];
    let derived = Engine::<FakeJobManager, FakeResourceManager>::derive_session_status(
        SessionStatus::Starting,
        &services,
    );
    assert_eq!(derived, Some(SessionStatus::Teardown));
}

#[test]
fn derive_session_status_leaves_active_session_alone() {
    use wfm_core::ServiceBuilder;
    let services = vec![ServiceBuilder::default().status(ServiceStatus::Allocated).build()];
    let derived =
        Engine::<FakeJobManager, FakeResourceManager>::derive_session_status(SessionStatus::Active, &services);
    assert_eq!(derived, None);
}

#[tokio::test]
async fn reconciling_an_async_start_with_an_unprobeable_service_stays_starting() {
    let engine = harness();
    let detailed = started_async(&engine).await;
    assert_eq!(detailed.session.status, SessionStatus::Starting);

    // SBB's fake probe always reports Unknown, so nothing should flip yet.
    let reconciled = engine.reconcile_session(&detailed.session.id, 1_100).await.unwrap().unwrap();
    assert_eq!(reconciled.session.status, SessionStatus::Starting);
}

#[tokio::test]
async fn reconciling_a_stopping_session_with_all_services_stopped_runs_cleanup() {
    let engine = harness();
    let detailed = started_async(&engine).await;
    engine.stop_session(StopSessionInput {
        session_name: "s1".to_string(),
        user: "alice".to_string(),
        force: false,
        sync_stop: false,
        now: 2_000,
    }).await.unwrap();

    for svc in engine.store().list_services_for_session(&detailed.session.id) {
        engine.store().update_service_status(&svc.id, ServiceStatus::Stopped).unwrap();
    }

    let reconciled = engine.reconcile_session(&detailed.session.id, 2_500).await.unwrap();
    assert!(reconciled.is_none());
    assert!(engine.store().get_session(&detailed.session.id).is_none());
}

fn seed_instance(engine: &Engine<FakeJobManager, FakeResourceManager>, jobid: i64, status: StepInstanceStatus) -> wfm_core::StepInstance {
    let session = wfm_core::Session {
        id: wfm_core::SessionId::new(),
        name: "s1".to_string(),
        workflow_name: "demo-workflow".to_string(),
        user: "alice".to_string(),
        start_ts: 1_000,
        end_ts: None,
        status: SessionStatus::Active,
    };
    engine.store().create_session(session.clone(), 1_000).unwrap();
    let step_description = wfm_core::StepDescription {
        id: wfm_core::StepDescriptionId::new(),
        session_id: session.id,
        service_id: None,
        name: "compute".to_string(),
        command: "echo hi".to_string(),
    };
    engine.store().create_step_description(step_description.clone(), 1_000).unwrap();
    let instance = wfm_core::StepInstance {
        id: StepInstanceId::new(),
        step_description_id: step_description.id,
        instance_name: "alice-s1-compute_1".to_string(),
        start_ts: 1_000,
        stop_ts: None,
        status,
        progress: String::new(),
        raw_job_status: String::new(),
        jobid,
        command: "echo hi".to_string(),
    };
    engine.store().create_step_instance(instance, 1_000).unwrap()
}

#[tokio::test]
async fn refresh_step_instance_combines_heterogeneous_status_for_display() {
    let engine = harness();
    let instance = seed_instance(&engine, 42, StepInstanceStatus::Running);
    engine.job_manager.set_job_state(42, "RUNNING COMPLETED");

    let refreshed = engine.refresh_step_instance(&instance).await;
    assert_eq!(refreshed.raw_job_status, "RUNNING COMPLETED");
    assert_eq!(refreshed.progress, "");
    assert_eq!(engine.job_manager.combine_for_display(&refreshed.raw_job_status), "RUNNING");
}

#[tokio::test]
async fn refresh_step_instance_with_no_jobid_is_a_no_op() {
    let engine = harness();
    let instance = seed_instance(&engine, wfm_core::NO_JOBID, StepInstanceStatus::Starting);
    let refreshed = engine.refresh_step_instance(&instance).await;
    assert_eq!(refreshed.status, StepInstanceStatus::Starting);
}
