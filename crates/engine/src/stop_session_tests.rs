use std::collections::HashMap;

use wfm_capabilities::{FakeJobManager, FakeResourceManager};
use wfm_core::{ServiceStatus, SessionStatus, StepInstanceStatus};
use wfm_store::Store;

use super::*;
use crate::start_session::StartSessionInput;
use crate::view::SessionDetailed;

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

async fn started(engine: &Engine<FakeJobManager, FakeResourceManager>, sync_start: bool) -> SessionDetailed {
    engine
        .start_session(StartSessionInput {
            workflow_file_name: "demo.yaml".to_string(),
            workflow_text: ONE_STEP.to_string(),
            session_name: "s1".to_string(),
            user: "alice".to_string(),
            cmdline_vars: HashMap::new(),
            sync_start,
            now: 1_000,
        })
        .await
        .unwrap()
}

fn stop_input(force: bool, sync_stop: bool) -> StopSessionInput {
    StopSessionInput {
        session_name: "s1".to_string(),
        user: "alice".to_string(),
        force,
        sync_stop,
        now: 2_000,
    }
}

#[tokio::test]
async fn graceful_sync_stop_with_no_instances_cleans_up_immediately() {
    let engine = harness();
    started(&engine, true).await;

    engine.stop_session(stop_input(false, true)).await.unwrap();

    assert!(engine.store().get_session_by_name("alice", "s1").is_none());
}

#[tokio::test]
async fn graceful_stop_with_a_running_step_is_refused_and_leaves_teardown() {
    let engine = harness();
    let detailed = started(&engine, true).await;
    let step_description = &detailed.step_descriptions[0];
    let instance = wfm_core::StepInstance {
        id: wfm_core::StepInstanceId::new(),
        step_description_id: step_description.id,
        instance_name: "alice-s1-compute_1".to_string(),
        start_ts: 1_500,
        stop_ts: None,
        status: StepInstanceStatus::Running,
        progress: String::new(),
        raw_job_status: String::new(),
        jobid: 7,
        command: "echo s1".to_string(),
    };
    engine.store().create_step_instance(instance, 1_500).unwrap();
    engine.job_manager.set_job_state(7, "RUNNING");

    let err = engine.stop_session(stop_input(false, true)).await.unwrap_err();
    assert!(matches!(err, WfmError::State(_)));

    let session = engine.store().get_session_by_name("alice", "s1").unwrap();
    assert_eq!(session.status, SessionStatus::Teardown);
}

#[tokio::test]
async fn forced_stop_cancels_a_running_step_and_proceeds_to_cleanup() {
    let engine = harness();
    let detailed = started(&engine, true).await;
    let step_description = &detailed.step_descriptions[0];
    let instance = wfm_core::StepInstance {
        id: wfm_core::StepInstanceId::new(),
        step_description_id: step_description.id,
        instance_name: "alice-s1-compute_1".to_string(),
        start_ts: 1_500,
        stop_ts: None,
        status: StepInstanceStatus::Running,
        progress: String::new(),
        raw_job_status: String::new(),
        jobid: 7,
        command: "echo s1".to_string(),
    };
    engine.store().create_step_instance(instance, 1_500).unwrap();
    engine.job_manager.set_job_state(7, "RUNNING");

    engine.stop_session(stop_input(true, true)).await.unwrap();

    assert_eq!(engine.job_manager.cancelled_jobs(), vec![7]);
    assert!(engine.store().get_session_by_name("alice", "s1").is_none());
}

#[tokio::test]
async fn async_stop_leaves_session_stopping_without_cleanup() {
    let engine = harness();
    started(&engine, true).await;

    engine.stop_session(stop_input(false, false)).await.unwrap();

    let session = engine.store().get_session_by_name("alice", "s1").unwrap();
    assert_eq!(session.status, SessionStatus::Stopping);
    let services = engine.store().list_services_for_session(&session.id);
    assert_eq!(services[0].status, ServiceStatus::Stopping);
}

#[tokio::test]
async fn stopping_an_already_stopped_session_without_force_is_refused() {
    let engine = harness();
    started(&engine, true).await;
    engine.stop_session(stop_input(false, true)).await.unwrap();

    let err = engine.stop_session(stop_input(false, true)).await.unwrap_err();
    assert!(matches!(err, WfmError::State(_)));
}
