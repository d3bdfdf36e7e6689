// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small lookup helpers shared by the entity modules.

use indexmap::IndexMap;

/// Look up a value by exact key, falling back to a unique prefix match
/// (mirrors how callers may cite a truncated id, e.g. in CLI output).
pub fn find_by_prefix<'a, V>(map: &'a IndexMap<String, V>, id: &str) -> Option<&'a V> {
    if let Some(v) = map.get(id) {
        return Some(v);
    }
    let mut matches = map.iter().filter(|(k, _)| k.starts_with(id));
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first.1)
}
