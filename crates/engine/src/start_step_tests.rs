use std::collections::HashMap;

use wfm_capabilities::{FakeJobManager, FakeResourceManager};
use wfm_core::{ServiceStatus, SessionStatus};
use wfm_store::Store;

use super::*;
use crate::start_session::StartSessionInput;

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
    command: "echo {{ SESSION }} {{ STEP }}"
    services:
      - name: scratch
"#;

const NO_SERVICE_STEP: &str = r#"
workflow:
  name: demo-workflow
services: []
steps:
  - name: compute
    command: "echo hi"
    services: []
"#;

fn harness() -> Engine<FakeJobManager, FakeResourceManager> {
    Engine::new(Store::new(), FakeJobManager::new(), FakeResourceManager::new())
}

async fn active_session(engine: &Engine<FakeJobManager, FakeResourceManager>, workflow: &str) -> wfm_core::SessionId {
    let detailed = engine
        .start_session(StartSessionInput {
            workflow_file_name: "demo.yaml".to_string(),
            workflow_text: workflow.to_string(),
            session_name: "s1".to_string(),
            user: "alice".to_string(),
            cmdline_vars: HashMap::new(),
            sync_start: true,
            now: 1_000,
        })
        .await
        .unwrap();
    detailed.session.id
}

fn step_input(cmdline_vars: HashMap<String, String>) -> StartStepInput {
    StartStepInput {
        session_name: "s1".to_string(),
        user: "alice".to_string(),
        step_name: "compute".to_string(),
        cmdline_vars,
        now: 2_000,
    }
}

#[tokio::test]
async fn start_step_submits_with_service_use_command_and_marks_running() {
    let engine = harness();
    active_session(&engine, ONE_STEP).await;

    let out = engine.start_step(step_input(HashMap::new())).await.unwrap();
    assert_eq!(out.instance_name, "alice-s1-compute_1");

    let instance = engine.store().get_step_instance(&out.id).unwrap();
    assert_eq!(instance.status, wfm_core::StepInstanceStatus::Running);
    assert!(instance.jobid >= 0);
    assert!(instance.command.contains("echo s1 compute"));
}

#[tokio::test]
async fn start_step_without_a_service_submits_directly() {
    let engine = harness();
    active_session(&engine, NO_SERVICE_STEP).await;

    let out = engine.start_step(step_input(HashMap::new())).await.unwrap();
    let instance = engine.store().get_step_instance(&out.id).unwrap();
    assert_eq!(instance.command, "echo hi");
}

#[tokio::test]
async fn second_instance_of_the_same_step_gets_the_next_index() {
    let engine = harness();
    active_session(&engine, ONE_STEP).await;

    let first = engine.start_step(step_input(HashMap::new())).await.unwrap();
    let second = engine.start_step(step_input(HashMap::new())).await.unwrap();
    assert_eq!(first.instance_name, "alice-s1-compute_1");
    assert_eq!(second.instance_name, "alice-s1-compute_2");
}

#[tokio::test]
async fn redefining_a_predefined_variable_on_the_command_line_is_an_error() {
    let engine = harness();
    active_session(&engine, ONE_STEP).await;

    let mut vars = HashMap::new();
    vars.insert("SESSION".to_string(), "hijack".to_string());
    let err = engine.start_step(step_input(vars)).await.unwrap_err();
    assert!(matches!(err, WfmError::Validation(_)));
}

#[tokio::test]
async fn start_step_is_refused_when_session_is_not_active() {
    let engine = harness();
    let session_id = active_session(&engine, ONE_STEP).await;
    engine.store().update_session_status(&session_id, SessionStatus::Stopping).unwrap();
    for svc in engine.store().list_services_for_session(&session_id) {
        engine.store().update_service_status(&svc.id, ServiceStatus::Stopping).unwrap();
    }

    let err = engine.start_step(step_input(HashMap::new())).await.unwrap_err();
    assert!(matches!(err, WfmError::State(_)));
}

#[tokio::test]
async fn start_step_for_an_unknown_name_is_rejected() {
    let engine = harness();
    active_session(&engine, ONE_STEP).await;

    let mut input = step_input(HashMap::new());
    input.step_name = "does-not-exist".to_string();
    let err = engine.start_step(input).await.unwrap_err();
    assert!(matches!(err, WfmError::State(_)));
}
