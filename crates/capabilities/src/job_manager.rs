// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The JobManager capability (spec.md §4.B): submission, cancellation,
//! state query and the status-vocabulary translation a Slurm-like batch
//! system exposes.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use wfm_core::WfmError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobManagerError {
    #[error("submission failed: {0}")]
    SubmitFailed(String),
    #[error("cancel failed for job {0}")]
    CancelFailed(i64),
    #[error("failed to list partitions: {0}")]
    ListPartitionsFailed(String),
}

impl From<JobManagerError> for WfmError {
    fn from(err: JobManagerError) -> Self {
        WfmError::external(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Partition {
    pub name: String,
}

/// Abstract contract for the cluster's batch job manager (spec.md §4.B).
#[async_trait]
pub trait JobManager: Clone + Send + Sync + 'static {
    /// Submit a prepared batch specification file, returning its jobid.
    async fn submit_batch(&self, spec_file: &Path, options: &[String]) -> Result<i64, JobManagerError>;

    /// Submit a command line directly (the "line" submission mode). `envs`
    /// carries any extra environment variables the submission needs
    /// (spec.md §6, e.g. `IOLIB_MODULES=EphemeralServices` for GBF/DASI).
    async fn submit_line(&self, options: &[String], envs: &[(String, String)]) -> Result<i64, JobManagerError>;

    async fn cancel(&self, jobid: i64) -> Result<(), JobManagerError>;

    /// Raw, possibly blank-separated job status. Never fails: a missing or
    /// errored query is reported as the job manager's STOPPED vocabulary
    /// token, matching "gone from the queue a long time ago" semantics.
    async fn get_job_state(&self, jobid: i64) -> String;

    async fn list_partitions(&self) -> Result<Vec<Partition>, JobManagerError>;

    fn translate_to_jm_status(&self, wfm_status: wfm_core::StepInstanceStatus) -> &'static str;
    fn translate_to_wfm_status(&self, jm_status: &str) -> wfm_core::StepInstanceStatus;

    /// Combine a heterogeneous job's blank-separated raw status into one
    /// token, for display (spec.md §4.B combination rules).
    fn combine_for_display(&self, raw_status: &str) -> String;

    /// Combine a heterogeneous job's blank-separated raw status into one
    /// token, to decide whether the job may be considered stopped.
    fn combine_for_stopping(&self, raw_status: &str) -> String;
}

/// Status vocabulary and combination rules for a Slurm-like job manager
/// (the category lists and tie-breaking order are spec.md §4.B verbatim).
mod slurm_status {
    pub const FAILURE: &[&str] =
        &["BOOT_FAIL", "DEADLINE", "FAILED", "NODE_FAIL", "OUT_OF_MEMORY", "TIMEOUT"];
    pub const HELD_OR_REQUEUED: &[&str] = &["RESV_DEL_HOLD", "REQUEUE_FED", "REQUEUE_HOLD"];
    pub const WAITING: &[&str] = &["CONFIGURING", "PENDING"];
    pub const SPECIAL: &[&str] = &["RESIZING", "SIGNALING"];
    pub const RUNNING: &[&str] = &["RUNNING"];
    pub const STOPPING: &[&str] = &["COMPLETING", "STAGE_OUT", "REQUEUED"];
    pub const STOPPED: &[&str] = &[
        "CANCELLED",
        "COMPLETED",
        "PREEMPTED",
        "REVOKED",
        "SPECIAL_EXIT",
        "STOPPED",
        "SUSPENDED",
    ];
    /// SUSPENDED has no category of its own in the display ordering (it
    /// falls into the terminal STOPPED bucket there) but still counts as
    /// unstoppable, so combine_for_stopping scans it as a distinct,
    /// lowest-priority category.
    pub const SUSPENDED: &[&str] = &["SUSPENDED"];
    pub const UNSTOPPABLE: &[&str] = &[
        "CONFIGURING",
        "COMPLETING",
        "PENDING",
        "RUNNING",
        "RESV_DEL_HOLD",
        "REQUEUE_FED",
        "REQUEUE_HOLD",
        "REQUEUED",
        "RESIZING",
        "SIGNALING",
        "STAGE_OUT",
        "SUSPENDED",
    ];

    pub fn combine_for_display(raw_status: &str) -> String {
        let tokens: Vec<&str> = raw_status.split_whitespace().collect();
        if tokens.len() <= 1 {
            return raw_status.to_string();
        }
        for group in [FAILURE, HELD_OR_REQUEUED, WAITING, SPECIAL, RUNNING, STOPPING] {
            if let Some(hit) = tokens.iter().find(|t| group.contains(t)) {
                return (*hit).to_string();
            }
        }
        "STOPPED".to_string()
    }

    pub fn combine_for_stopping(raw_status: &str) -> String {
        let tokens: Vec<&str> = raw_status.split_whitespace().collect();
        if tokens.len() <= 1 {
            return raw_status.to_string();
        }
        // Same category-priority order as combine_for_display (held/waiting
        // before running/stopping), restricted to the unstoppable
        // categories: FAILURE never applies here since a failed job is
        // already stopped, not unstoppable.
        for group in [HELD_OR_REQUEUED, WAITING, SPECIAL, RUNNING, STOPPING, SUSPENDED] {
            if let Some(hit) = tokens.iter().find(|t| group.contains(t) && UNSTOPPABLE.contains(t)) {
                return (*hit).to_string();
            }
        }
        "STOPPED".to_string()
    }
}

/// Job manager commands, as loaded from configuration (spec.md §9: process
/// config is settings loaded at init and immutable afterward).
#[derive(Debug, Clone)]
pub struct SlurmCommands {
    pub job_state_cmd: String,
    pub job_cancel_cmd: String,
    pub job_control_cmd: String,
    pub submit_cmd: String,
}

#[derive(Clone)]
pub struct SlurmJobManager {
    commands: SlurmCommands,
}

impl SlurmJobManager {
    pub fn new(commands: SlurmCommands) -> Self {
        Self { commands }
    }

    async fn run_output(&self, program: &str, args: &[String]) -> Result<(String, bool), String> {
        self.run_output_with_env(program, args, &[]).await
    }

    async fn run_output_with_env(
        &self,
        program: &str,
        args: &[String],
        envs: &[(String, String)],
    ) -> Result<(String, bool), String> {
        let output = Command::new(program)
            .args(args)
            .envs(envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| e.to_string())?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((stdout, output.status.success()))
    }
}

#[async_trait]
impl JobManager for SlurmJobManager {
    async fn submit_batch(&self, spec_file: &Path, options: &[String]) -> Result<i64, JobManagerError> {
        let mut args = vec![spec_file.display().to_string()];
        args.extend(options.iter().cloned());
        let (stdout, ok) =
            self.run_output(&self.commands.submit_cmd, &args).await.map_err(JobManagerError::SubmitFailed)?;
        if !ok {
            return Err(JobManagerError::SubmitFailed(stdout));
        }
        stdout
            .split_whitespace()
            .last()
            .and_then(|tok| tok.parse::<i64>().ok())
            .ok_or_else(|| JobManagerError::SubmitFailed(format!("could not parse jobid from {stdout:?}")))
    }

    async fn submit_line(&self, options: &[String], envs: &[(String, String)]) -> Result<i64, JobManagerError> {
        let (stdout, ok) = self
            .run_output_with_env(&self.commands.submit_cmd, options, envs)
            .await
            .map_err(JobManagerError::SubmitFailed)?;
        if !ok {
            return Err(JobManagerError::SubmitFailed(stdout));
        }
        stdout
            .split_whitespace()
            .last()
            .and_then(|tok| tok.parse::<i64>().ok())
            .ok_or_else(|| JobManagerError::SubmitFailed(format!("could not parse jobid from {stdout:?}")))
    }

    async fn cancel(&self, jobid: i64) -> Result<(), JobManagerError> {
        tracing::info!(jobid, "canceling job");
        let (_, ok) = self
            .run_output(&self.commands.job_cancel_cmd, &[jobid.to_string()])
            .await
            .map_err(|_| JobManagerError::CancelFailed(jobid))?;
        if !ok {
            return Err(JobManagerError::CancelFailed(jobid));
        }
        Ok(())
    }

    async fn get_job_state(&self, jobid: i64) -> String {
        let args = vec!["-h".to_string(), "--job".to_string(), jobid.to_string(), "--format=%T".to_string()];
        match self.run_output(&self.commands.job_state_cmd, &args).await {
            Ok((stdout, true)) if !stdout.is_empty() => {
                let combined: Vec<String> = stdout.split_whitespace().map(|s| s.to_uppercase()).collect();
                tracing::debug!(jobid, status = %combined.join(" "), "raw job state");
                combined.join(" ")
            }
            _ => "STOPPED".to_string(),
        }
    }

    async fn list_partitions(&self) -> Result<Vec<Partition>, JobManagerError> {
        let args = vec!["--hide".to_string(), "-o".to_string(), "show".to_string(), "partitions".to_string()];
        let (stdout, ok) = self
            .run_output(&self.commands.job_control_cmd, &args)
            .await
            .map_err(JobManagerError::ListPartitionsFailed)?;
        if !ok || stdout.is_empty() {
            return Ok(Vec::new());
        }
        let partitions = stdout
            .lines()
            .filter_map(|line| {
                let first = line.split_whitespace().next()?;
                let name = first.strip_prefix("PartitionName=")?;
                Some(Partition { name: name.to_string() })
            })
            .collect();
        Ok(partitions)
    }

    fn translate_to_jm_status(&self, wfm_status: wfm_core::StepInstanceStatus) -> &'static str {
        use wfm_core::StepInstanceStatus::*;
        match wfm_status {
            Starting => "PENDING",
            Running => "RUNNING",
            Stopping => "COMPLETING",
            Stopped => "COMPLETED",
            Suspended => "SUSPENDED",
        }
    }

    fn translate_to_wfm_status(&self, jm_status: &str) -> wfm_core::StepInstanceStatus {
        use wfm_core::StepInstanceStatus;
        let token = jm_status.to_uppercase();
        if slurm_status::FAILURE.contains(&token.as_str()) || slurm_status::STOPPED.contains(&token.as_str()) {
            StepInstanceStatus::Stopped
        } else if slurm_status::HELD_OR_REQUEUED.contains(&token.as_str()) {
            StepInstanceStatus::Suspended
        } else if slurm_status::WAITING.contains(&token.as_str()) {
            StepInstanceStatus::Starting
        } else if slurm_status::STOPPING.contains(&token.as_str()) {
            StepInstanceStatus::Stopping
        } else {
            StepInstanceStatus::Running
        }
    }

    fn combine_for_display(&self, raw_status: &str) -> String {
        slurm_status::combine_for_display(raw_status)
    }

    fn combine_for_stopping(&self, raw_status: &str) -> String {
        slurm_status::combine_for_stopping(raw_status)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct FakeState {
        next_jobid: i64,
        states: HashMap<i64, String>,
        cancelled: Vec<i64>,
        partitions: Vec<Partition>,
    }

    /// Fake job manager for engine/workflow tests: submissions hand out
    /// sequential jobids and `get_job_state` returns whatever was seeded.
    #[derive(Clone)]
    pub struct FakeJobManager {
        inner: Arc<Mutex<FakeState>>,
    }

    impl Default for FakeJobManager {
        fn default() -> Self {
            Self { inner: Arc::new(Mutex::new(FakeState { next_jobid: 1, ..Default::default() })) }
        }
    }

    impl FakeJobManager {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_job_state(&self, jobid: i64, raw_status: impl Into<String>) {
            self.inner.lock().states.insert(jobid, raw_status.into());
        }

        pub fn set_partitions(&self, partitions: Vec<Partition>) {
            self.inner.lock().partitions = partitions;
        }

        pub fn cancelled_jobs(&self) -> Vec<i64> {
            self.inner.lock().cancelled.clone()
        }
    }

    #[async_trait]
    impl JobManager for FakeJobManager {
        async fn submit_batch(&self, _spec_file: &Path, _options: &[String]) -> Result<i64, JobManagerError> {
            let mut state = self.inner.lock();
            let jobid = state.next_jobid;
            state.next_jobid += 1;
            Ok(jobid)
        }

        async fn submit_line(&self, _options: &[String], _envs: &[(String, String)]) -> Result<i64, JobManagerError> {
            let mut state = self.inner.lock();
            let jobid = state.next_jobid;
            state.next_jobid += 1;
            Ok(jobid)
        }

        async fn cancel(&self, jobid: i64) -> Result<(), JobManagerError> {
            self.inner.lock().cancelled.push(jobid);
            Ok(())
        }

        async fn get_job_state(&self, jobid: i64) -> String {
            self.inner.lock().states.get(&jobid).cloned().unwrap_or_else(|| "STOPPED".to_string())
        }

        async fn list_partitions(&self) -> Result<Vec<Partition>, JobManagerError> {
            Ok(self.inner.lock().partitions.clone())
        }

        fn translate_to_jm_status(&self, wfm_status: wfm_core::StepInstanceStatus) -> &'static str {
            use wfm_core::StepInstanceStatus::*;
            match wfm_status {
                Starting => "PENDING",
                Running => "RUNNING",
                Stopping => "COMPLETING",
                Stopped => "COMPLETED",
                Suspended => "SUSPENDED",
            }
        }

        fn translate_to_wfm_status(&self, jm_status: &str) -> wfm_core::StepInstanceStatus {
            SlurmJobManager::new(SlurmCommands {
                job_state_cmd: String::new(),
                job_cancel_cmd: String::new(),
                job_control_cmd: String::new(),
                submit_cmd: String::new(),
            })
            .translate_to_wfm_status(jm_status)
        }

        fn combine_for_display(&self, raw_status: &str) -> String {
            slurm_status::combine_for_display(raw_status)
        }

        fn combine_for_stopping(&self, raw_status: &str) -> String {
            slurm_status::combine_for_stopping(raw_status)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeJobManager;

#[cfg(test)]
#[path = "job_manager_tests.rs"]
mod tests;
