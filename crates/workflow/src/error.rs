// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation failures (spec.md §4.E, §7 ValidationError), each carrying
//! enough detail to name the failing workflow file and key(s).

use thiserror::Error;
use wfm_core::WfmError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("workflow description must have exactly the top-level keys {{workflow, services, steps}}, found: {0:?}")]
    UnexpectedTopLevelKeys(Vec<String>),
    #[error("'workflow' must be a mapping with exactly {{name}}")]
    MalformedWorkflowHeader,
    #[error("service '{0}': must have exactly the keys {{name, type, attributes}}")]
    MalformedServiceDecl(String),
    #[error("service '{name}': attribute keys must exactly match {{{expected:?}}}, found {{{found:?}}}")]
    AttributeKeyMismatch { name: String, expected: Vec<String>, found: Vec<String> },
    #[error("service '{0}': name must be non-empty and must not contain '/'")]
    InvalidServiceName(String),
    #[error("session name must be non-empty and must not contain '/'")]
    InvalidSessionName,
    #[error("step '{0}': must have exactly the keys {{name, command, services}} (optional: location)")]
    MalformedStepDecl(String),
    #[error("step '{0}' declares more than one service; only one is supported in this version")]
    TooManyServicesPerStep(String),
    #[error("step name '{0}' is declared more than once")]
    DuplicateStepName(String),
    #[error("step '{step}' references undeclared service '{service}'")]
    UndeclaredServiceReference { step: String, service: String },
    #[error("predefined variables should not be redefined: '{0}'")]
    PredefinedVariableRedefined(String),
    #[error("undefined variable(s) {names:?} remain in {context}")]
    UndefinedVariables { context: String, names: Vec<String> },
    #[error("unknown service kind '{0}'")]
    UnknownServiceKind(String),
    #[error("service '{0}': {1}")]
    ServiceAttributeInvalid(String, String),
    #[error("{0}")]
    ServiceSetInvalid(String),
    #[error("failed to parse workflow description: {0}")]
    MalformedYaml(String),
}

impl From<ValidationError> for WfmError {
    fn from(err: ValidationError) -> Self {
        WfmError::validation(err.to_string())
    }
}

impl From<wfm_capabilities::EphemeralServiceError> for ValidationError {
    fn from(err: wfm_capabilities::EphemeralServiceError) -> Self {
        use wfm_capabilities::EphemeralServiceError::*;
        match err {
            InvalidAttributes { name, detail } => ValidationError::ServiceAttributeInvalid(name, detail),
            InvalidSet(detail) => ValidationError::ServiceSetInvalid(detail),
            StartFailed(name, detail) | StopFailed(name, detail) => {
                ValidationError::ServiceAttributeInvalid(name, detail)
            }
            UnsupportedKind(kind) => ValidationError::UnknownServiceKind(kind),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
