use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use wfm_capabilities::{FakeJobManager, FakeResourceManager};
use wfm_store::Store;
use wfm_wire::{
    AccessRequest, ErrorResponse, SessionDetailedView, StartSessionRequest, StartStepRequest,
    StartStepResponse, StepDescriptionSummary, StepProgressRequest, StepStatusSummary, StopSessionRequest,
};

use super::build_router;
use crate::state::AppState;

const ONE_STEP_WORKFLOW: &str = r#"
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

async fn spawn() -> (SocketAddr, FakeJobManager) {
    let job_manager = FakeJobManager::new();
    let state = AppState { engine: wfm_engine::Engine::new(Store::new(), job_manager.clone(), FakeResourceManager::new()) };
    let router = build_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    (addr, job_manager)
}

#[tokio::test]
async fn full_session_and_step_lifecycle() {
    let (addr, job_manager) = spawn().await;
    let base = format!("http://{addr}");
    let client = reqwest::Client::new();

    let start_req = StartSessionRequest {
        workflow_description_file: "demo.yaml".to_string(),
        workflow_description: ONE_STEP_WORKFLOW.to_string(),
        sync_start: true,
        session_name: "s1".to_string(),
        user_name: "alice".to_string(),
        replacements: HashMap::new(),
    };
    let resp = client.post(format!("{base}/session/startup")).json(&start_req).send().await.expect("request");
    assert_eq!(resp.status(), 200);
    let detailed: SessionDetailedView = resp.json().await.expect("body");
    assert_eq!(detailed.session.status, "ACTIVE");
    assert_eq!(detailed.services.len(), 1);
    assert_eq!(detailed.step_descriptions.len(), 1);

    let resp = client
        .get(format!("{base}/session/s1"))
        .query(&[("user_name", "alice")])
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);

    let resp = client.get(format!("{base}/session/all")).send().await.expect("request");
    assert_eq!(resp.status(), 200);
    let all: Vec<serde_json::Value> = resp.json().await.expect("body");
    assert_eq!(all.len(), 1);

    let resp = client
        .get(format!("{base}/step/description/all"))
        .query(&[("session_name", "s1"), ("user_name", "alice")])
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    let descriptions: Vec<StepDescriptionSummary> = resp.json().await.expect("body");
    assert_eq!(descriptions.len(), 1);
    assert_eq!(descriptions[0].name, "compute");

    let step_req = StartStepRequest {
        session_name: "s1".to_string(),
        user_name: "alice".to_string(),
        step_name: "compute".to_string(),
        replacements: HashMap::new(),
    };
    let resp = client.post(format!("{base}/step/startup")).json(&step_req).send().await.expect("request");
    assert_eq!(resp.status(), 200);
    let started: StartStepResponse = resp.json().await.expect("body");
    assert_eq!(started.instance_name, "alice-s1-compute_1");

    job_manager.set_job_state(1, "RUNNING");
    let progress_req = StepProgressRequest { jobid: 1, progress: "PENDING".to_string() };
    let resp = client.post(format!("{base}/step/progress/job")).json(&progress_req).send().await.expect("request");
    assert_eq!(resp.status(), 200);

    let resp = client
        .get(format!("{base}/step/status/s1"))
        .query(&[("user_name", "alice")])
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status(), 200);
    let statuses: Vec<StepStatusSummary> = resp.json().await.expect("body");
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].display_status, "RUNNING");

    let access_req =
        AccessRequest { session_name: "s1".to_string(), user_name: "alice".to_string(), services: Vec::new() };
    let resp = client.post(format!("{base}/session/access")).json(&access_req).send().await.expect("request");
    assert_eq!(resp.status(), 200);

    let resp = client.get(format!("{base}/resource/locations")).send().await.expect("request");
    assert_eq!(resp.status(), 200);

    let resp = client.get(format!("{base}/service/all")).send().await.expect("request");
    assert_eq!(resp.status(), 200);
    let services: Vec<serde_json::Value> = resp.json().await.expect("body");
    assert_eq!(services.len(), 1);

    let resp = client.get(format!("{base}/service/alice-s1-scratch")).send().await.expect("request");
    assert_eq!(resp.status(), 200);

    let resp = client.get(format!("{base}/service/ghost-service")).send().await.expect("request");
    assert_eq!(resp.status(), 404);

    job_manager.set_job_state(1, "COMPLETED");
    let stop_req = StopSessionRequest { sync_stop: true, session_name: "s1".to_string(), user_name: "alice".to_string() };
    let resp = client.post(format!("{base}/session/stop")).json(&stop_req).send().await.expect("request");
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn unknown_session_surfaces_404_with_detail() {
    let (addr, _job_manager) = spawn().await;
    let base = format!("http://{addr}");
    let client = reqwest::Client::new();

    let stop_req =
        StopSessionRequest { sync_stop: false, session_name: "ghost".to_string(), user_name: "alice".to_string() };
    let resp = client.post(format!("{base}/session/stop")).json(&stop_req).send().await.expect("request");
    assert_eq!(resp.status(), 404);
    let body: ErrorResponse = resp.json().await.expect("body");
    assert!(body.detail.contains("ghost"));
}
