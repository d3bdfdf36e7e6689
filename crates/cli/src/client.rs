// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin HTTP client for the WFM daemon's surface: one method per endpoint
//! listed in spec.md §6, translating its `{detail}` error bodies into
//! `anyhow::Error`s the command handlers propagate unchanged.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wfm_capabilities::{Flavor, Location};
use wfm_wire::{
    AccessRequest, ErrorResponse, ServiceSummary, SessionDetailedView, SessionSummary, StartSessionRequest,
    StartStepRequest, StartStepResponse, StepDescriptionSummary, StepProgressRequest, StepStatusSummary,
    StopSessionRequest,
};

/// Resolves the current OS user the way every mutating request needs it
/// (spec.md §6 request shapes carry `user_name`), mirroring `getpass.getuser()`.
pub fn current_user() -> String {
    std::env::var("USER").or_else(|_| std::env::var("LOGNAME")).unwrap_or_else(|_| "unknown".to_string())
}

pub struct WfmClient {
    http: reqwest::Client,
    base_url: String,
}

impl WfmClient {
    /// Builds a client against `WFM_API_URL` (default `http://127.0.0.1:8080/`).
    pub fn from_env() -> Self {
        let configured = std::env::var("WFM_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
        let base_url = if configured.ends_with('/') { configured } else { format!("{configured}/") };
        let http = reqwest::Client::builder().timeout(Duration::from_secs(60)).build().unwrap_or_default();
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get<R: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<R> {
        let resp = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .with_context(|| format!("cannot connect to WFM API at {}", self.base_url))?;
        Self::decode(resp).await
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("cannot connect to WFM API at {}", self.base_url))?;
        Self::decode(resp).await
    }

    async fn decode<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R> {
        if resp.status().is_success() {
            resp.json::<R>().await.context("malformed response body")
        } else {
            let detail = match resp.json::<ErrorResponse>().await {
                Ok(err) => err.detail,
                Err(_) => "request failed".to_string(),
            };
            Err(anyhow!(detail))
        }
    }

    pub async fn start_session(
        &self,
        workflow_description_file: String,
        workflow_description: String,
        session_name: String,
        sync_start: bool,
        replacements: HashMap<String, String>,
    ) -> Result<SessionDetailedView> {
        let req = StartSessionRequest {
            workflow_description_file,
            workflow_description,
            sync_start,
            session_name,
            user_name: current_user(),
            replacements,
        };
        self.post("session/startup", &req).await
    }

    pub async fn stop_session(&self, session_name: String, sync_stop: bool, force: bool) -> Result<()> {
        let req = StopSessionRequest { sync_stop, session_name, user_name: current_user() };
        let path = if force { "session/forcedstop" } else { "session/stop" };
        let _: u32 = self.post(path, &req).await?;
        Ok(())
    }

    pub async fn access_session(&self, session_name: String, services: Vec<String>) -> Result<String> {
        let req = AccessRequest { session_name, user_name: current_user(), services };
        self.post("session/access", &req).await
    }

    pub async fn start_step(
        &self,
        session_name: String,
        step_name: String,
        replacements: HashMap<String, String>,
    ) -> Result<StartStepResponse> {
        let req = StartStepRequest { session_name, user_name: current_user(), step_name, replacements };
        self.post("step/startup", &req).await
    }

    pub async fn update_step_progress(&self, jobid: i64, progress: String) -> Result<String> {
        let req = StepProgressRequest { jobid, progress };
        self.post("step/progress/job", &req).await
    }

    pub async fn sessions_all(&self) -> Result<Vec<SessionSummary>> {
        self.get("session/all", &[]).await
    }

    pub async fn sessions_all_detailed(&self) -> Result<Vec<SessionDetailedView>> {
        self.get("session/alldetailed", &[]).await
    }

    pub async fn session_by_name(&self, name: &str) -> Result<Vec<SessionSummary>> {
        let user = current_user();
        self.get(&format!("session/{name}"), &[("user_name", user.as_str())]).await
    }

    pub async fn step_status(&self, session: &str, step: Option<&str>) -> Result<Vec<StepStatusSummary>> {
        let path = match step {
            Some(step) => format!("step/status/{session}/{step}"),
            None => format!("step/status/{session}"),
        };
        let user = current_user();
        self.get(&path, &[("user_name", user.as_str())]).await
    }

    pub async fn step_descriptions_all(&self, session_name: &str) -> Result<Vec<StepDescriptionSummary>> {
        let user = current_user();
        self.get("step/description/all", &[("session_name", session_name), ("user_name", user.as_str())]).await
    }

    pub async fn services_all(&self) -> Result<Vec<ServiceSummary>> {
        self.get("service/all", &[]).await
    }

    pub async fn service_by_name(&self, name: &str) -> Result<ServiceSummary> {
        self.get(&format!("service/{name}"), &[]).await
    }

    pub async fn locations(&self) -> Result<Vec<Location>> {
        self.get("resource/locations", &[]).await
    }

    pub async fn flavors(&self) -> Result<Vec<Flavor>> {
        self.get("resource/flavors", &[]).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
