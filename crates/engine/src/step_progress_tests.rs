use wfm_core::{StepDescriptionId, StepInstance, StepInstanceId, StepInstanceStatus};
use wfm_store::Store;

use super::*;

fn seed_instance(store: &Store, session_name: &str, instance_name: &str, jobid: i64) -> StepInstanceId {
    let session = wfm_core::Session {
        id: wfm_core::SessionId::new(),
        name: session_name.to_string(),
        workflow_name: "demo-workflow".to_string(),
        user: "alice".to_string(),
        start_ts: 1_000,
        end_ts: None,
        status: wfm_core::SessionStatus::Active,
    };
    store.create_session(session.clone(), 1_000).unwrap();
    let step_description = wfm_core::StepDescription {
        id: StepDescriptionId::new(),
        session_id: session.id,
        service_id: None,
        name: "compute".to_string(),
        command: "echo hi".to_string(),
    };
    store.create_step_description(step_description.clone(), 1_000).unwrap();
    let instance = StepInstance {
        id: StepInstanceId::new(),
        step_description_id: step_description.id,
        instance_name: instance_name.to_string(),
        start_ts: 1_000,
        stop_ts: None,
        status: StepInstanceStatus::Running,
        progress: String::new(),
        raw_job_status: String::new(),
        jobid,
        command: "echo hi".to_string(),
    };
    store.create_step_instance(instance, 1_000).unwrap().id
}

#[test]
fn progress_update_is_persisted_for_the_matching_jobid() {
    let engine = Engine::new(
        Store::new(),
        wfm_capabilities::FakeJobManager::new(),
        wfm_capabilities::FakeResourceManager::new(),
    );
    let id = seed_instance(engine.store(), "s1", "alice-s1-compute_1", 42);

    let name = engine
        .update_step_progress(StepProgressInput { jobid: 42, progress: "50%".to_string() })
        .unwrap();
    assert_eq!(name, "alice-s1-compute_1");
    assert_eq!(engine.store().get_step_instance(&id).unwrap().progress, "50%");
}

#[test]
fn progress_update_for_unknown_jobid_is_refused() {
    let engine = Engine::new(
        Store::new(),
        wfm_capabilities::FakeJobManager::new(),
        wfm_capabilities::FakeResourceManager::new(),
    );
    let err = engine
        .update_step_progress(StepProgressInput { jobid: 999, progress: "50%".to_string() })
        .unwrap_err();
    assert!(matches!(err, WfmError::State(_)));
}

#[test]
fn progress_update_with_a_jobid_shared_by_two_instances_is_refused() {
    let engine = Engine::new(
        Store::new(),
        wfm_capabilities::FakeJobManager::new(),
        wfm_capabilities::FakeResourceManager::new(),
    );
    seed_instance(engine.store(), "s1", "alice-s1-compute_1", 7);
    seed_instance(engine.store(), "s2", "alice-s2-compute_1", 7);

    let err = engine
        .update_step_progress(StepProgressInput { jobid: 7, progress: "50%".to_string() })
        .unwrap_err();
    assert!(matches!(err, WfmError::State(_)));
}
