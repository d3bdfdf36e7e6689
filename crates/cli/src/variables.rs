// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsing for `-d/--define var=val` command-line variable definitions
//! (spec.md §6 CLI surface), turned into the `{{ var }}` → `val`
//! replacement map the workflow substitution step consumes.

use std::collections::HashMap;

/// Validates and converts a single `key=value` definition into the
/// `("{{ key }}", value)` pair the daemon's `replacements` map expects.
/// `key` must start with a letter and otherwise contain only alphanumerics
/// and underscores; `value` must be non-empty.
pub fn parse_define(input: &str) -> Result<(String, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("variable definition '{input}' must have the form key=value"))?;

    if key.is_empty() || value.is_empty() {
        return Err(format!("variable definition '{input}' must have the form key=value"));
    }
    let mut chars = key.chars();
    let first = chars.next().ok_or_else(|| format!("variable definition '{input}' must have the form key=value"))?;
    if !first.is_alphabetic() {
        return Err(format!("left part of the definition should begin with a letter: '{input}'"));
    }
    if !chars.all(|c| c.is_alphanumeric() || c == '_') {
        return Err(format!(
            "left part of the definition should contain only alphanumeric chars or '_': '{input}'"
        ));
    }

    Ok((format!("{{{{ {key} }}}}"), value.to_string()))
}

pub fn to_replacements(defines: &[(String, String)]) -> HashMap<String, String> {
    defines.iter().cloned().collect()
}

#[cfg(test)]
#[path = "variables_tests.rs"]
mod tests;
