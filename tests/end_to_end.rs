//! Workspace-level integration tests: one per concrete scenario (spec.md
//! §8), each driving the full `wfm-workflow` validation path through
//! `wfm-engine`'s protocols against an in-memory `Store` and the `Fake*`
//! capabilities, the way `crates/daemon/src/routes/mod_tests.rs` exercises
//! the HTTP surface but one layer down, without a server in the loop.

use std::collections::HashMap;
use std::io::Write;

use wfm_capabilities::{FakeJobManager, FakeResourceManager};
use wfm_core::{ServiceStatus, SessionStatus, StepInstanceStatus, WfmError};
use wfm_engine::{AccessInput, Engine, StartSessionInput, StartStepInput, StopSessionInput};
use wfm_store::Store;

fn harness() -> Engine<FakeJobManager, FakeResourceManager> {
    Engine::new(Store::new(), FakeJobManager::new(), FakeResourceManager::new())
}

fn start_session_input(workflow_text: &str, session_name: &str, user: &str, sync_start: bool, now: u64) -> StartSessionInput {
    StartSessionInput {
        workflow_file_name: "demo.yaml".to_string(),
        workflow_text: workflow_text.to_string(),
        session_name: session_name.to_string(),
        user: user.to_string(),
        cmdline_vars: HashMap::new(),
        sync_start,
        now,
    }
}

const ONE_SBB_STEP: &str = r#"
workflow:
  name: demo-workflow
services:
  - name: s
    type: SBB
    attributes:
      flavor: small
      targets: "/t"
steps:
  - name: run
    command: "sbatch job.sh"
    services:
      - name: s
"#;

#[tokio::test]
async fn happy_path_sync_start_single_step_then_stop() {
    let engine = harness();

    let started = engine.start_session(start_session_input(ONE_SBB_STEP, "session0", "user", true, 1_000)).await.unwrap();
    assert_eq!(started.session.status, SessionStatus::Active);
    assert_eq!(started.services.len(), 1);
    assert_eq!(started.services[0].name, "user-session0-s");
    assert_eq!(started.services[0].status, ServiceStatus::Allocated);
    assert_eq!(started.step_descriptions.len(), 1);
    assert_eq!(started.step_descriptions[0].name, "run");

    let step = engine
        .start_step(StartStepInput {
            session_name: "session0".to_string(),
            user: "user".to_string(),
            step_name: "run".to_string(),
            cmdline_vars: HashMap::new(),
            now: 1_001,
        })
        .await
        .unwrap();
    assert_eq!(step.instance_name, "user-session0-run_1");

    let instances = engine
        .store()
        .list_step_instances_for_description(&started.step_descriptions[0].id);
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].status, StepInstanceStatus::Running);

    engine
        .stop_session(StopSessionInput { session_name: "session0".to_string(), user: "user".to_string(), force: false, sync_stop: true, now: 2_000 })
        .await
        .unwrap();

    assert!(engine.store().get_session_by_name("user", "session0").is_none());
    assert!(engine.store().list_services_for_session(&started.session.id).is_empty());
    assert!(engine.store().list_step_descriptions_for_session(&started.session.id).is_empty());
    assert!(engine.store().list_step_instances_for_description(&started.step_descriptions[0].id).is_empty());
}

const TWO_SBB_SERVICES: &str = r#"
workflow:
  name: demo-workflow
services:
  - name: a
    type: SBB
    attributes:
      flavor: small
      targets: "/t"
  - name: b
    type: SBB
    attributes:
      flavor: small
      targets: "/t"
steps:
  - name: step-a
    command: echo a
    services:
      - name: a
  - name: step-b
    command: echo b
    services:
      - name: b
"#;

#[tokio::test]
async fn rollback_on_second_service_reservation_failure() {
    let job_manager = FakeJobManager::new();
    let resource_manager = FakeResourceManager::new();
    let engine = Engine::new(Store::new(), job_manager, resource_manager.clone());
    // `a` starts fine; `b`'s reservation is refused regardless of order,
    // forcing the already-started `a` back through the rollback path.
    resource_manager.refuse_service("user-s1-b", "not enough capacity");

    let err = engine.start_session(start_session_input(TWO_SBB_SERVICES, "s1", "user", false, 1_000)).await.unwrap_err();
    match err {
        WfmError::Resource(detail) => assert!(detail.contains("user-s1-b")),
        other => panic!("expected a resource error, got {other:?}"),
    }
    assert_eq!(resource_manager.reservations().len(), 1);
    assert!(engine.store().list_sessions().is_empty());
    assert!(engine.store().list_namespace_locks().is_empty());
}

#[tokio::test]
async fn forced_stop_cancels_the_pending_step_job() {
    let job_manager = FakeJobManager::new();
    let resource_manager = FakeResourceManager::new();
    let engine = Engine::new(Store::new(), job_manager.clone(), resource_manager);

    let started = engine.start_session(start_session_input(ONE_SBB_STEP, "session0", "user", true, 1_000)).await.unwrap();
    engine
        .start_step(StartStepInput {
            session_name: "session0".to_string(),
            user: "user".to_string(),
            step_name: "run".to_string(),
            cmdline_vars: HashMap::new(),
            now: 1_001,
        })
        .await
        .unwrap();

    let instances = engine.store().list_step_instances_for_description(&started.step_descriptions[0].id);
    assert_eq!(instances[0].status, StepInstanceStatus::Running);
    job_manager.set_job_state(instances[0].jobid, "RUNNING");

    engine
        .stop_session(StopSessionInput { session_name: "session0".to_string(), user: "user".to_string(), force: true, sync_stop: true, now: 2_000 })
        .await
        .unwrap();

    assert_eq!(job_manager.cancelled_jobs(), vec![instances[0].jobid]);
    assert!(engine.store().get_session_by_name("user", "session0").is_none());
}

const SHARED_NAMESPACE_GBF: &str = r#"
workflow:
  name: demo-workflow
services:
  - name: g
    type: GBF
    attributes:
      mountpoint: /mnt/shared
      namespace: /shared/ns
      storagesize: 10GB
steps:
  - name: run
    command: echo hi
    services:
      - name: g
"#;

#[tokio::test]
async fn namespace_collision_across_sessions_is_refused() {
    let engine = harness();
    engine.start_session(start_session_input(SHARED_NAMESPACE_GBF, "s1", "user", true, 1_000)).await.unwrap();

    let err = engine.start_session(start_session_input(SHARED_NAMESPACE_GBF, "s2", "user", true, 1_000)).await.unwrap_err();
    match err {
        WfmError::Resource(detail) => {
            assert!(detail.contains("NS /shared/ns already used by other services"));
            assert!(detail.contains("user-s1-g"));
        }
        other => panic!("expected a resource error, got {other:?}"),
    }

    let locks = engine.store().list_namespace_locks();
    assert_eq!(locks.len(), 1);
    assert_eq!(locks[0].namespace, "/shared/ns");
}

#[tokio::test]
async fn heterogeneous_job_status_combines_by_the_documented_rules() {
    let job_manager = FakeJobManager::new();
    let engine = Engine::new(Store::new(), job_manager.clone(), FakeResourceManager::new());
    engine.start_session(start_session_input(ONE_SBB_STEP, "session0", "user", true, 1_000)).await.unwrap();
    let started_step = engine
        .start_step(StartStepInput {
            session_name: "session0".to_string(),
            user: "user".to_string(),
            step_name: "run".to_string(),
            cmdline_vars: HashMap::new(),
            now: 1_001,
        })
        .await
        .unwrap();
    let jobid = engine
        .store()
        .get_step_instance(&started_step.id)
        .expect("instance just created")
        .jobid;

    job_manager.set_job_state(jobid, "RUNNING PENDING");
    let statuses = engine.step_status("user", "session0", None).await.unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].display_status, "PENDING");

    job_manager.set_job_state(jobid, "COMPLETED STOPPED");
    let statuses = engine.step_status("user", "session0", None).await.unwrap();
    assert_eq!(statuses[0].display_status, "STOPPED");
}

const DASI_STEP: &str = r#"
workflow:
  name: demo-workflow
services:
  - name: d
    type: DASI
    attributes:
      namespace: /tmp/test
      dasiconfig: "__CONFIG_PATH__"
steps:
  - name: run
    command: echo hi
    services:
      - name: d
"#;

#[tokio::test]
async fn dasi_attribute_rewrite_derives_mountpoint_and_namespace() {
    let mut config = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(config, "schema_roots:\n  - path: /mnt_points/dasi").expect("write config");
    let workflow = DASI_STEP.replace("__CONFIG_PATH__", &config.path().to_string_lossy());

    let engine = harness();
    let started = engine.start_session(start_session_input(&workflow, "s1", "user", true, 1_000)).await.unwrap();

    let svc = &started.services[0];
    assert_eq!(svc.mountpoint, "/mnt_points/dasi");
    let expected_file = wfm_capabilities::ephemeral_service::DasiService::namespace_file_name("/mnt_points/dasi");
    assert_eq!(svc.namespace, format!("/tmp/test/{expected_file}"));
}

#[tokio::test]
async fn access_session_returns_the_sole_usable_services_command() {
    let engine = harness();
    engine.start_session(start_session_input(ONE_SBB_STEP, "session0", "user", true, 1_000)).await.unwrap();

    let command = engine
        .access_session(AccessInput { session_name: "session0".to_string(), user: "user".to_string(), services: Vec::new() })
        .await
        .unwrap();
    assert!(command.contains("--bb=persistentdw:user-session0-s"));
}
