// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration (spec.md §9: "process-wide state is just settings
//! loaded at init and immutable afterward"). Every value is read once from
//! the environment at startup; nothing here is mutated after [`WfmSettings::from_env`]
//! returns.

use std::net::SocketAddr;

use thiserror::Error;
use wfm_capabilities::SlurmCommands;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid WFM_BIND_ADDR {0:?}: {1}")]
    InvalidBindAddr(String, std::net::AddrParseError),
}

/// The resource manager the daemon wires at startup (spec.md §4.D): either
/// a real HTTP-backed one, or the "NONE" fallback that admits every
/// reservation and defers location/flavor listings to the job manager.
#[derive(Debug, Clone)]
pub enum ResourceManagerConfig {
    Http { base_url: String },
    None,
}

#[derive(Debug, Clone)]
pub struct WfmSettings {
    pub bind_addr: SocketAddr,
    pub slurm_commands: SlurmCommands,
    pub resource_manager: ResourceManagerConfig,
}

impl WfmSettings {
    /// Load settings from the environment, applying the documented
    /// defaults for everything not explicitly set.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `WFM_BIND_ADDR` | `127.0.0.1:8080` |
    /// | `WFM_JOB_STATE_CMD` | `squeue` |
    /// | `WFM_JOB_CANCEL_CMD` | `scancel` |
    /// | `WFM_JOB_CONTROL_CMD` | `scontrol` |
    /// | `WFM_SUBMIT_CMD` | `sbatch` |
    /// | `WFM_RESOURCE_MANAGER_URL` | unset → `ResourceManagerConfig::None` |
    pub fn from_env() -> Result<Self, SettingsError> {
        let bind_addr_str = std::env::var("WFM_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_addr_str
            .parse()
            .map_err(|e| SettingsError::InvalidBindAddr(bind_addr_str.clone(), e))?;

        let slurm_commands = SlurmCommands {
            job_state_cmd: env_or("WFM_JOB_STATE_CMD", "squeue"),
            job_cancel_cmd: env_or("WFM_JOB_CANCEL_CMD", "scancel"),
            job_control_cmd: env_or("WFM_JOB_CONTROL_CMD", "scontrol"),
            submit_cmd: env_or("WFM_SUBMIT_CMD", "sbatch"),
        };

        let resource_manager = match std::env::var("WFM_RESOURCE_MANAGER_URL") {
            Ok(url) if !url.is_empty() => ResourceManagerConfig::Http { base_url: url },
            _ => ResourceManagerConfig::None,
        };

        Ok(Self { bind_addr, slurm_commands, resource_manager })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
