// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The EphemeralService capability (spec.md §4.C): per-kind validation,
//! start/stop, status probing, the interactive "use" command and the
//! reservation-request builder consumed by the ResourceManager capability.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;
use wfm_core::{Service, ServiceKind, ServiceStatus, WfmError};

use crate::resource_manager::ReservationRequest;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EphemeralServiceError {
    #[error("service '{name}': {detail}")]
    InvalidAttributes { name: String, detail: String },
    #[error("{0}")]
    InvalidSet(String),
    #[error("start failed for service '{0}': {1}")]
    StartFailed(String, String),
    #[error("stop failed for service '{0}': {1}")]
    StopFailed(String, String),
    #[error("unsupported service kind: {0}")]
    UnsupportedKind(String),
}

impl From<EphemeralServiceError> for WfmError {
    fn from(err: EphemeralServiceError) -> Self {
        match err {
            EphemeralServiceError::InvalidAttributes { .. } | EphemeralServiceError::InvalidSet(_) => {
                WfmError::validation(err.to_string())
            }
            EphemeralServiceError::StartFailed(..) | EphemeralServiceError::StopFailed(..) => {
                WfmError::external(err.to_string())
            }
            EphemeralServiceError::UnsupportedKind(_) => WfmError::not_supported(err.to_string()),
        }
    }
}

/// A freshly-declared service from the workflow description, before it has
/// an id or session (attribute rewriting happens on this shape, spec.md
/// §4.G.1 step 3).
#[derive(Debug, Clone)]
pub struct PendingService {
    pub declared_name: String,
    pub kind: ServiceKind,
    pub attributes: BTreeMap<String, String>,
}

impl PendingService {
    pub fn new(declared_name: impl Into<String>, kind: ServiceKind) -> Self {
        Self { declared_name: declared_name.into(), kind, attributes: BTreeMap::new() }
    }
}

/// Mandatory/optional attribute keys for a service kind (spec.md §4.E.3).
pub struct AttributeKeys {
    pub mandatory: &'static [&'static str],
    pub optional: &'static [&'static str],
}

/// Abstract contract per ephemeral-service kind (spec.md §4.C).
#[async_trait]
pub trait EphemeralService: Send + Sync {
    fn kind(&self) -> ServiceKind;

    fn attribute_keys(&self) -> AttributeKeys;

    /// Validate (and, for DASI, rewrite) one service's attributes in place.
    fn validate_attributes(&self, pending: &mut PendingService) -> Result<(), EphemeralServiceError>;

    /// Cross-service constraints among every declared service of this kind
    /// in one workflow (distinct mountpoints, distinct namespaces, ...).
    fn validate_set(&self, services: &[PendingService]) -> Result<(), EphemeralServiceError>;

    async fn start_sync(&self, srv: &Service, workflow: &str, run_id: &str) -> Result<(), EphemeralServiceError>;

    /// Returns the batch jobid, or an error if submission failed.
    async fn start_async(&self, srv: &Service, workflow: &str, run_id: &str)
        -> Result<i64, EphemeralServiceError>;

    async fn stop_sync(
        &self,
        srv_name: &str,
        start_jobid: i64,
        partition: &str,
        workflow: &str,
        run_id: &str,
    ) -> Result<(), EphemeralServiceError>;

    async fn stop_async(
        &self,
        srv_name: &str,
        start_jobid: i64,
        partition: &str,
        workflow: &str,
        run_id: &str,
    ) -> Result<i64, EphemeralServiceError>;

    async fn probe_status(&self, srv_name: &str) -> ServiceStatus;

    /// Best-effort: any spec/batch files written for this service are removed.
    async fn cleanup_temp_files(&self, srv_name: &str);

    /// Shell command string enriching an interactive access request
    /// (spec.md §4.G.4): a full, human-pasteable line including the
    /// batch-submission program name.
    fn build_use_command(&self, srv_name: &str, partition: &str) -> String;

    /// Batch-system options a step submission through this service picks
    /// up (spec.md §4.G.3 step 7), as individual argv tokens — never a
    /// shell line, since these are handed to [`JobManager::submit_line`]
    /// as separate arguments rather than interpreted by a shell.
    fn submit_options(&self, srv_name: &str, partition: &str) -> Vec<String>;

    /// Extra environment variables a step submission through this service
    /// carries (spec.md §6: `IOLIB_MODULES=EphemeralServices` for GBF/DASI).
    /// Empty by default.
    fn submit_env(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Reservation-request shape sent to the ResourceManager (spec.md §6).
    fn fill_reservation(&self, srv: &Service, user: &str) -> ReservationRequest;
}

fn is_absolute_dir_like(value: &str) -> bool {
    value.starts_with('/') && !value.contains("..")
}

fn valid_storage_size(value: &str) -> bool {
    !value.is_empty() && value.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Slurm Burst Buffer.
pub struct SbbService;

#[async_trait]
impl EphemeralService for SbbService {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Sbb
    }

    fn attribute_keys(&self) -> AttributeKeys {
        AttributeKeys { mandatory: &["flavor", "targets"], optional: &["location", "datanodes"] }
    }

    fn validate_attributes(&self, pending: &mut PendingService) -> Result<(), EphemeralServiceError> {
        let flavor = pending.attributes.get("flavor").map(String::as_str).unwrap_or_default();
        if flavor.is_empty() {
            return Err(EphemeralServiceError::InvalidAttributes {
                name: pending.declared_name.clone(),
                detail: "flavor must not be empty".into(),
            });
        }
        let targets = pending.attributes.get("targets").map(String::as_str).unwrap_or_default();
        if targets.is_empty() {
            return Err(EphemeralServiceError::InvalidAttributes {
                name: pending.declared_name.clone(),
                detail: "targets must not be empty".into(),
            });
        }
        Ok(())
    }

    fn validate_set(&self, _services: &[PendingService]) -> Result<(), EphemeralServiceError> {
        Ok(())
    }

    async fn start_sync(&self, _srv: &Service, _workflow: &str, _run_id: &str) -> Result<(), EphemeralServiceError> {
        Ok(())
    }

    async fn start_async(
        &self,
        _srv: &Service,
        _workflow: &str,
        _run_id: &str,
    ) -> Result<i64, EphemeralServiceError> {
        Ok(1)
    }

    async fn stop_sync(
        &self,
        _srv_name: &str,
        _start_jobid: i64,
        _partition: &str,
        _workflow: &str,
        _run_id: &str,
    ) -> Result<(), EphemeralServiceError> {
        Ok(())
    }

    async fn stop_async(
        &self,
        _srv_name: &str,
        _start_jobid: i64,
        _partition: &str,
        _workflow: &str,
        _run_id: &str,
    ) -> Result<i64, EphemeralServiceError> {
        Ok(1)
    }

    async fn probe_status(&self, _srv_name: &str) -> ServiceStatus {
        ServiceStatus::Unknown
    }

    async fn cleanup_temp_files(&self, _srv_name: &str) {}

    fn build_use_command(&self, srv_name: &str, partition: &str) -> String {
        format!("sbatch --partition={} --bb=persistentdw:{}", wfm_core::shell_quote(partition), srv_name)
    }

    fn submit_options(&self, srv_name: &str, partition: &str) -> Vec<String> {
        vec![format!("--partition={partition}"), format!("--bb=persistentdw:{srv_name}")]
    }

    fn fill_reservation(&self, srv: &Service, user: &str) -> ReservationRequest {
        let mut attributes = serde_json::Map::new();
        attributes.insert("flavor".into(), serde_json::Value::String(srv.flavor.clone()));
        attributes.insert(
            "targets".into(),
            serde_json::Value::Array(
                srv.targets.split(':').map(|t| serde_json::Value::String(t.to_string())).collect(),
            ),
        );
        ReservationRequest::new(srv, user, "SBB", attributes)
    }
}

/// NFS-over-Ganesha backend ("GBF" in the job-manager vocabulary).
pub struct GbfService;

impl GbfService {
    fn validate_common(name: &str, attrs: &BTreeMap<String, String>) -> Result<(), EphemeralServiceError> {
        let mountpoint = attrs.get("mountpoint").map(String::as_str).unwrap_or_default();
        if !is_absolute_dir_like(mountpoint) {
            return Err(EphemeralServiceError::InvalidAttributes {
                name: name.to_string(),
                detail: format!("mountpoint '{mountpoint}' must be an absolute path"),
            });
        }
        let namespace = attrs.get("namespace").map(String::as_str).unwrap_or_default();
        if !is_absolute_dir_like(namespace) {
            return Err(EphemeralServiceError::InvalidAttributes {
                name: name.to_string(),
                detail: format!("namespace '{namespace}' must be an absolute writable directory"),
            });
        }
        let storagesize = attrs.get("storagesize").map(String::as_str).unwrap_or_default();
        if !valid_storage_size(storagesize) {
            return Err(EphemeralServiceError::InvalidAttributes {
                name: name.to_string(),
                detail: format!("storagesize '{storagesize}' is not well-formed"),
            });
        }
        if let Some(datanodes) = attrs.get("datanodes") {
            let n: u32 = datanodes.parse().map_err(|_| EphemeralServiceError::InvalidAttributes {
                name: name.to_string(),
                detail: "datanodes must be an integer".into(),
            })?;
            if n > 1 {
                return Err(EphemeralServiceError::InvalidAttributes {
                    name: name.to_string(),
                    detail: "datanodes is limited to 1 for GBF/DASI".into(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EphemeralService for GbfService {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Gbf
    }

    fn attribute_keys(&self) -> AttributeKeys {
        AttributeKeys {
            mandatory: &["mountpoint", "namespace", "storagesize"],
            optional: &["location", "datanodes"],
        }
    }

    fn validate_attributes(&self, pending: &mut PendingService) -> Result<(), EphemeralServiceError> {
        Self::validate_common(&pending.declared_name, &pending.attributes)
    }

    fn validate_set(&self, services: &[PendingService]) -> Result<(), EphemeralServiceError> {
        check_distinct(services, "mountpoint", "mountpoints")?;
        check_distinct(services, "namespace", "namespaces")?;
        Ok(())
    }

    async fn start_sync(&self, _srv: &Service, _workflow: &str, _run_id: &str) -> Result<(), EphemeralServiceError> {
        Ok(())
    }

    async fn start_async(
        &self,
        _srv: &Service,
        _workflow: &str,
        _run_id: &str,
    ) -> Result<i64, EphemeralServiceError> {
        Ok(1)
    }

    async fn stop_sync(
        &self,
        _srv_name: &str,
        _start_jobid: i64,
        _partition: &str,
        _workflow: &str,
        _run_id: &str,
    ) -> Result<(), EphemeralServiceError> {
        Ok(())
    }

    async fn stop_async(
        &self,
        _srv_name: &str,
        _start_jobid: i64,
        _partition: &str,
        _workflow: &str,
        _run_id: &str,
    ) -> Result<i64, EphemeralServiceError> {
        Ok(1)
    }

    async fn probe_status(&self, _srv_name: &str) -> ServiceStatus {
        ServiceStatus::Unknown
    }

    async fn cleanup_temp_files(&self, _srv_name: &str) {}

    fn build_use_command(&self, srv_name: &str, partition: &str) -> String {
        format!(
            "IOLIB_MODULES=EphemeralServices sbatch --partition={} --dependency-filesystem={}",
            wfm_core::shell_quote(partition),
            wfm_core::shell_quote(srv_name)
        )
    }

    fn submit_options(&self, srv_name: &str, partition: &str) -> Vec<String> {
        vec![format!("--partition={partition}"), format!("--dependency-filesystem={srv_name}")]
    }

    fn submit_env(&self) -> Vec<(String, String)> {
        vec![("IOLIB_MODULES".to_string(), "EphemeralServices".to_string())]
    }

    fn fill_reservation(&self, srv: &Service, user: &str) -> ReservationRequest {
        let mut attributes = serde_json::Map::new();
        attributes.insert("gssize".into(), serde_json::Value::String(srv.storagesize.clone()));
        attributes.insert("mountpoint".into(), serde_json::Value::String(srv.mountpoint.clone()));
        ReservationRequest::new(srv, user, "GBF", attributes)
    }
}

/// DASI data store: a GBF variant whose mountpoint/namespace are derived
/// from a config file resolving to exactly one root path (spec.md §4.C,
/// §4.F, §6 scenario 6).
pub struct DasiService;

impl DasiService {
    /// Resolve a DASI config file to its single root path. Grounded on the
    /// original `dasi.yaml` schema: a top-level `schema_roots: [{path: ...}]`
    /// sequence that must name exactly one absolute path.
    pub fn resolve_config_root(config_text: &str) -> Result<String, String> {
        let doc: serde_yaml::Value =
            serde_yaml::from_str(config_text).map_err(|e| format!("invalid DASI config: {e}"))?;
        let roots = doc
            .get("schema_roots")
            .and_then(|v| v.as_sequence())
            .ok_or_else(|| "DASI config missing 'schema_roots'".to_string())?;
        let paths: Vec<String> = roots
            .iter()
            .filter_map(|r| r.get("path").and_then(|p| p.as_str()).map(str::to_string))
            .collect();
        match paths.as_slice() {
            [one] if is_absolute_dir_like(one) => Ok(one.clone()),
            [] => Err("DASI config resolves to zero root paths".to_string()),
            _ => Err("DASI config must resolve to exactly one root path".to_string()),
        }
    }

    /// `sha256_hex(mountpoint)` file name under the service's namespace
    /// (spec.md §4.F).
    pub fn namespace_file_name(mountpoint: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(mountpoint.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[async_trait]
impl EphemeralService for DasiService {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Dasi
    }

    fn attribute_keys(&self) -> AttributeKeys {
        AttributeKeys { mandatory: &["namespace", "dasiconfig"], optional: &["location", "datanodes"] }
    }

    fn validate_attributes(&self, pending: &mut PendingService) -> Result<(), EphemeralServiceError> {
        let namespace = pending.attributes.get("namespace").cloned().unwrap_or_default();
        if !is_absolute_dir_like(&namespace) {
            return Err(EphemeralServiceError::InvalidAttributes {
                name: pending.declared_name.clone(),
                detail: format!("namespace '{namespace}' must be an absolute writable directory"),
            });
        }
        let config_path = pending.attributes.get("dasiconfig").cloned().unwrap_or_default();
        let config_text = std::fs::read_to_string(&config_path).map_err(|e| EphemeralServiceError::InvalidAttributes {
            name: pending.declared_name.clone(),
            detail: format!("cannot read DASI config file '{config_path}': {e}"),
        })?;
        let mountpoint = Self::resolve_config_root(&config_text).map_err(|detail| {
            EphemeralServiceError::InvalidAttributes { name: pending.declared_name.clone(), detail }
        })?;
        let file_name = Self::namespace_file_name(&mountpoint);
        pending.attributes.insert("mountpoint".into(), mountpoint);
        pending.attributes.insert("namespace".into(), format!("{namespace}/{file_name}"));
        Ok(())
    }

    fn validate_set(&self, services: &[PendingService]) -> Result<(), EphemeralServiceError> {
        check_distinct(services, "dasiconfig", "DASI config files")
    }

    async fn start_sync(&self, _srv: &Service, _workflow: &str, _run_id: &str) -> Result<(), EphemeralServiceError> {
        Ok(())
    }

    async fn start_async(
        &self,
        _srv: &Service,
        _workflow: &str,
        _run_id: &str,
    ) -> Result<i64, EphemeralServiceError> {
        Ok(1)
    }

    async fn stop_sync(
        &self,
        _srv_name: &str,
        _start_jobid: i64,
        _partition: &str,
        _workflow: &str,
        _run_id: &str,
    ) -> Result<(), EphemeralServiceError> {
        Ok(())
    }

    async fn stop_async(
        &self,
        _srv_name: &str,
        _start_jobid: i64,
        _partition: &str,
        _workflow: &str,
        _run_id: &str,
    ) -> Result<i64, EphemeralServiceError> {
        Ok(1)
    }

    async fn probe_status(&self, _srv_name: &str) -> ServiceStatus {
        ServiceStatus::Unknown
    }

    async fn cleanup_temp_files(&self, _srv_name: &str) {}

    fn build_use_command(&self, srv_name: &str, partition: &str) -> String {
        format!(
            "IOLIB_MODULES=EphemeralServices sbatch --partition={} --dasi-namespace={}",
            wfm_core::shell_quote(partition),
            wfm_core::shell_quote(srv_name)
        )
    }

    fn submit_options(&self, srv_name: &str, partition: &str) -> Vec<String> {
        vec![format!("--partition={partition}"), format!("--dasi-namespace={srv_name}")]
    }

    fn submit_env(&self) -> Vec<(String, String)> {
        vec![("IOLIB_MODULES".to_string(), "EphemeralServices".to_string())]
    }

    fn fill_reservation(&self, srv: &Service, user: &str) -> ReservationRequest {
        let mut attributes = serde_json::Map::new();
        attributes.insert("gssize".into(), serde_json::Value::String(srv.storagesize.clone()));
        attributes.insert("mountpoint".into(), serde_json::Value::String(srv.mountpoint.clone()));
        ReservationRequest::new(srv, user, "DASI", attributes)
    }
}

/// No ephemeral service: steps submit directly through the job manager
/// (spec.md §4.C).
pub struct NoneService;

#[async_trait]
impl EphemeralService for NoneService {
    fn kind(&self) -> ServiceKind {
        ServiceKind::None
    }

    fn attribute_keys(&self) -> AttributeKeys {
        AttributeKeys { mandatory: &[], optional: &[] }
    }

    fn validate_attributes(&self, _pending: &mut PendingService) -> Result<(), EphemeralServiceError> {
        Ok(())
    }

    fn validate_set(&self, _services: &[PendingService]) -> Result<(), EphemeralServiceError> {
        Ok(())
    }

    async fn start_sync(&self, _srv: &Service, _workflow: &str, _run_id: &str) -> Result<(), EphemeralServiceError> {
        Ok(())
    }

    async fn start_async(
        &self,
        _srv: &Service,
        _workflow: &str,
        _run_id: &str,
    ) -> Result<i64, EphemeralServiceError> {
        Ok(0)
    }

    async fn stop_sync(
        &self,
        _srv_name: &str,
        _start_jobid: i64,
        _partition: &str,
        _workflow: &str,
        _run_id: &str,
    ) -> Result<(), EphemeralServiceError> {
        Ok(())
    }

    async fn stop_async(
        &self,
        _srv_name: &str,
        _start_jobid: i64,
        _partition: &str,
        _workflow: &str,
        _run_id: &str,
    ) -> Result<i64, EphemeralServiceError> {
        Ok(0)
    }

    async fn probe_status(&self, _srv_name: &str) -> ServiceStatus {
        ServiceStatus::Allocated
    }

    async fn cleanup_temp_files(&self, _srv_name: &str) {}

    fn build_use_command(&self, _srv_name: &str, partition: &str) -> String {
        format!("sbatch --partition={}", wfm_core::shell_quote(partition))
    }

    fn submit_options(&self, _srv_name: &str, partition: &str) -> Vec<String> {
        vec![format!("--partition={partition}")]
    }

    fn fill_reservation(&self, srv: &Service, user: &str) -> ReservationRequest {
        ReservationRequest::new(srv, user, "NONE", serde_json::Map::new())
    }
}

fn check_distinct(
    services: &[PendingService],
    key: &str,
    plural_label: &str,
) -> Result<(), EphemeralServiceError> {
    let mut seen = std::collections::HashSet::new();
    for s in services {
        if let Some(v) = s.attributes.get(key) {
            if !seen.insert(v.clone()) {
                return Err(EphemeralServiceError::InvalidSet(format!(
                    "two services declare the same {}: '{}'",
                    plural_label.trim_end_matches('s'),
                    v
                )));
            }
        }
    }
    Ok(())
}

/// Look up the `EphemeralService` impl for a kind (spec.md §9: "Dynamic
/// service-kind dispatch... model this as a tagged variant with an
/// interface-object table keyed by kind").
pub fn for_kind(kind: ServiceKind) -> Box<dyn EphemeralService> {
    match kind {
        ServiceKind::Sbb => Box::new(SbbService),
        ServiceKind::Gbf => Box::new(GbfService),
        ServiceKind::Dasi => Box::new(DasiService),
        ServiceKind::None => Box::new(NoneService),
    }
}

#[cfg(test)]
#[path = "ephemeral_service_tests.rs"]
mod tests;
