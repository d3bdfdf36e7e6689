// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Variable substitution over the raw workflow text (spec.md §4.E.7):
//! `{{ identifier }}` placeholders, resolved against two dictionaries
//! (predefined, then cmdline), applied before YAML parsing.

use crate::error::ValidationError;
use std::collections::HashMap;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("constant regex pattern is valid")
});

/// `SESSION` and `USER` are always defined by the engine; `STEP` is added
/// once a specific step's command is being resolved (spec.md §4.G.3).
pub fn predefined_vars(session: &str, user: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    vars.insert("SESSION".to_string(), session.to_string());
    vars.insert("USER".to_string(), user.to_string());
    vars
}

/// Merge a cmdline dictionary into a predefined one, refusing any key that
/// would redefine a predefined variable (spec.md §4.E.7).
pub fn merge_cmdline_vars(
    predefined: &HashMap<String, String>,
    cmdline: &HashMap<String, String>,
) -> Result<HashMap<String, String>, ValidationError> {
    for key in cmdline.keys() {
        if predefined.contains_key(key) {
            return Err(ValidationError::PredefinedVariableRedefined(key.clone()));
        }
    }
    let mut merged = predefined.clone();
    merged.extend(cmdline.iter().map(|(k, v)| (k.clone(), v.clone())));
    Ok(merged)
}

/// Replace every `{{ identifier }}` occurrence whose identifier is known;
/// unknown identifiers are left untouched so a later, more specific
/// substitution pass (e.g. `{{ STEP }}` at start-step time) can resolve them.
pub fn substitute(text: &str, vars: &HashMap<String, String>) -> String {
    VAR_PATTERN
        .replace_all(text, |caps: &regex::Captures| {
            let name = &caps[1];
            vars.get(name).cloned().unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Fail if any `{{ identifier }}` pattern remains (spec.md §4.E.7, §4.G.3
/// step 5). Returns the offending identifiers.
pub fn residual_variables(text: &str) -> Vec<String> {
    VAR_PATTERN.captures_iter(text).map(|c| c[1].to_string()).collect()
}

pub fn ensure_no_residual(text: &str, context: &str) -> Result<(), ValidationError> {
    let residual = residual_variables(text);
    if residual.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::UndefinedVariables { context: context.to_string(), names: residual })
    }
}

#[cfg(test)]
#[path = "substitution_tests.rs"]
mod tests;
