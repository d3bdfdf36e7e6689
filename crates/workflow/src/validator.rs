// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workflow-description validator (spec.md §4.E): schema enforcement,
//! per-kind attribute/set checks (dispatched to the EphemeralService
//! capability), cross-reference checks, and residual-variable detection.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde_yaml::Value;
use wfm_capabilities::{ephemeral_service, EphemeralServiceError, PendingService};
use wfm_core::ServiceKind;

use crate::description::{ServiceDecl, StepDecl, StepServiceRef, WorkflowDescription, WorkflowHeader};
use crate::error::ValidationError;
use crate::substitution;

/// Result of a successful validation: the typed description plus the
/// `declared name -> kind` map validated attribute dictionaries were
/// checked against (useful to callers building reservation requests).
pub struct Validated {
    pub description: WorkflowDescription,
}

fn parse_kind(raw: &str) -> Result<ServiceKind, ValidationError> {
    match raw.to_uppercase().as_str() {
        "SBB" => Ok(ServiceKind::Sbb),
        "GBF" => Ok(ServiceKind::Gbf),
        "DASI" => Ok(ServiceKind::Dasi),
        "NONE" => Ok(ServiceKind::None),
        other => Err(ValidationError::UnknownServiceKind(other.to_string())),
    }
}

fn is_valid_name_fragment(name: &str) -> bool {
    !name.is_empty() && !name.contains('/')
}

fn keys_of(map: &serde_yaml::Mapping) -> Vec<String> {
    map.keys().filter_map(|k| k.as_str().map(str::to_string)).collect()
}

fn expect_exact_keys(map: &serde_yaml::Mapping, expected: &[&str]) -> bool {
    let found: HashSet<&str> = map.keys().filter_map(|k| k.as_str()).collect();
    let expected_set: HashSet<&str> = expected.iter().copied().collect();
    found == expected_set
}

/// Top-level schema + per-kind validation + cross-references (spec.md
/// §4.E.1-6). Takes the already variable-substituted YAML text.
pub fn validate(text: &str, workflow_file: &str) -> Result<Validated, ValidationError> {
    let doc: Value =
        serde_yaml::from_str(text).map_err(|e| ValidationError::MalformedYaml(format!("{workflow_file}: {e}")))?;
    let root = doc.as_mapping().ok_or_else(|| {
        ValidationError::UnexpectedTopLevelKeys(vec!["<not a mapping>".to_string()])
    })?;

    if !expect_exact_keys(root, &["workflow", "services", "steps"]) {
        return Err(ValidationError::UnexpectedTopLevelKeys(keys_of(root)));
    }

    let workflow = validate_workflow_header(root.get("workflow"))?;
    let service_decls = validate_service_decls(root.get("services"))?;
    let step_decls = validate_step_decls(root.get("steps"), &service_decls)?;

    // Per-kind attribute + cross-service-set validation (spec.md §4.E.4, §4.C).
    let mut by_kind: HashMap<ServiceKind, Vec<PendingService>> = HashMap::new();
    for decl in &service_decls {
        let kind = parse_kind(&decl.kind)?;
        let mut pending = PendingService::new(decl.name.clone(), kind);
        pending.attributes = decl.attributes.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        by_kind.entry(kind).or_default().push(pending);
    }

    let mut resolved_attrs: HashMap<String, IndexMap<String, String>> = HashMap::new();
    for (kind, mut pendings) in by_kind {
        let svc = ephemeral_service::for_kind(kind);
        for pending in &mut pendings {
            svc.validate_attributes(pending).map_err(attribute_error)?;
        }
        svc.validate_set(&pendings).map_err(set_error)?;
        for pending in pendings {
            resolved_attrs
                .insert(pending.declared_name.clone(), pending.attributes.into_iter().collect());
        }
    }

    let mut description =
        WorkflowDescription { workflow, services: service_decls, steps: step_decls };
    for svc in description.services.iter_mut() {
        if let Some(attrs) = resolved_attrs.remove(&svc.name) {
            svc.attributes = attrs;
        }
    }

    // Residual `{{ var }}` check over every non-command field (spec.md §4.E.7).
    check_no_residuals(&description)?;

    Ok(Validated { description })
}

fn attribute_error(err: EphemeralServiceError) -> ValidationError {
    err.into()
}

fn set_error(err: EphemeralServiceError) -> ValidationError {
    err.into()
}

fn validate_workflow_header(value: Option<&Value>) -> Result<WorkflowHeader, ValidationError> {
    let map = value.and_then(Value::as_mapping).ok_or(ValidationError::MalformedWorkflowHeader)?;
    if !expect_exact_keys(map, &["name"]) {
        return Err(ValidationError::MalformedWorkflowHeader);
    }
    let name = map
        .get("name")
        .and_then(Value::as_str)
        .ok_or(ValidationError::MalformedWorkflowHeader)?
        .to_string();
    Ok(WorkflowHeader { name })
}

fn validate_service_decls(value: Option<&Value>) -> Result<Vec<ServiceDecl>, ValidationError> {
    let seq = value.and_then(Value::as_sequence).ok_or_else(|| {
        ValidationError::MalformedServiceDecl("<services is not a sequence>".to_string())
    })?;
    let mut decls = Vec::with_capacity(seq.len());
    for item in seq {
        let map = item
            .as_mapping()
            .ok_or_else(|| ValidationError::MalformedServiceDecl("<not a mapping>".to_string()))?;
        if !expect_exact_keys(map, &["name", "type", "attributes"]) {
            let name = map.get("name").and_then(Value::as_str).unwrap_or("<unnamed>");
            return Err(ValidationError::MalformedServiceDecl(name.to_string()));
        }
        let name = map
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ValidationError::MalformedServiceDecl("<unnamed>".to_string()))?
            .to_string();
        if !is_valid_name_fragment(&name) {
            return Err(ValidationError::InvalidServiceName(name));
        }
        let kind = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ValidationError::MalformedServiceDecl(name.clone()))?
            .to_string();
        let attrs_map = map
            .get("attributes")
            .and_then(Value::as_mapping)
            .ok_or_else(|| ValidationError::MalformedServiceDecl(name.clone()))?;
        let mut attributes = IndexMap::new();
        for (k, v) in attrs_map {
            let key = k.as_str().ok_or_else(|| ValidationError::MalformedServiceDecl(name.clone()))?;
            let val = value_to_string(v)
                .ok_or_else(|| ValidationError::MalformedServiceDecl(name.clone()))?;
            attributes.insert(key.to_string(), val);
        }
        decls.push(ServiceDecl { name, kind, attributes });
    }
    Ok(decls)
}

fn value_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn validate_step_decls(
    value: Option<&Value>,
    service_decls: &[ServiceDecl],
) -> Result<Vec<StepDecl>, ValidationError> {
    let declared_names: HashSet<&str> = service_decls.iter().map(|s| s.name.as_str()).collect();
    let seq = value
        .and_then(Value::as_sequence)
        .ok_or_else(|| ValidationError::MalformedStepDecl("<steps is not a sequence>".to_string()))?;
    let mut decls = Vec::with_capacity(seq.len());
    let mut seen_names = HashSet::new();
    for item in seq {
        let map = item.as_mapping().ok_or_else(|| ValidationError::MalformedStepDecl("<not a mapping>".into()))?;
        let found: HashSet<&str> = map.keys().filter_map(|k| k.as_str()).collect();
        let allowed_no_location: HashSet<&str> = ["name", "command", "services"].into_iter().collect();
        let allowed_with_location: HashSet<&str> =
            ["name", "command", "services", "location"].into_iter().collect();
        if found != allowed_no_location && found != allowed_with_location {
            let name = map.get("name").and_then(Value::as_str).unwrap_or("<unnamed>");
            return Err(ValidationError::MalformedStepDecl(name.to_string()));
        }
        let name = map
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ValidationError::MalformedStepDecl("<unnamed>".to_string()))?
            .to_string();
        if !seen_names.insert(name.clone()) {
            return Err(ValidationError::DuplicateStepName(name));
        }
        let command = map
            .get("command")
            .and_then(Value::as_str)
            .ok_or_else(|| ValidationError::MalformedStepDecl(name.clone()))?
            .to_string();
        let location = map.get("location").and_then(Value::as_str).map(str::to_string);
        let services_seq = map
            .get("services")
            .and_then(Value::as_sequence)
            .ok_or_else(|| ValidationError::MalformedStepDecl(name.clone()))?;
        if services_seq.len() > 1 {
            return Err(ValidationError::TooManyServicesPerStep(name));
        }
        let mut services = Vec::with_capacity(services_seq.len());
        for svc_item in services_seq {
            let svc_map = svc_item
                .as_mapping()
                .ok_or_else(|| ValidationError::MalformedStepDecl(name.clone()))?;
            let svc_name = svc_map
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| ValidationError::MalformedStepDecl(name.clone()))?
                .to_string();
            if !declared_names.contains(svc_name.as_str()) {
                return Err(ValidationError::UndeclaredServiceReference { step: name.clone(), service: svc_name });
            }
            let datamovers = svc_map.get("datamovers").and_then(Value::as_str).map(str::to_string);
            services.push(StepServiceRef { name: svc_name, datamovers });
        }
        decls.push(StepDecl { name, command, services, location });
    }
    Ok(decls)
}

fn check_no_residuals(description: &WorkflowDescription) -> Result<(), ValidationError> {
    substitution::ensure_no_residual(&description.workflow.name, "workflow.name")?;
    for svc in &description.services {
        substitution::ensure_no_residual(&svc.name, &format!("service '{}' name", svc.name))?;
        for (k, v) in &svc.attributes {
            substitution::ensure_no_residual(v, &format!("service '{}' attribute '{}'", svc.name, k))?;
        }
    }
    for step in &description.steps {
        // Command lines may still carry step-level variables (e.g. {{ STEP }})
        // resolved later at start-step time (spec.md §4.E.7).
        substitution::ensure_no_residual(&step.name, &format!("step '{}' name", step.name))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
