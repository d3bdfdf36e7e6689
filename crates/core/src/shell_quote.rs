// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Safe quoting for values interpolated into batch/job-manager command
//! lines (spec.md §9: "Forbidden characters and injection").

/// Wrap a value in single quotes, escaping any single quotes it contains
/// using the standard `'\''` shell idiom (end quote, escaped literal quote,
/// restart quote).
///
/// Every value substituted into a command string built for the job manager
/// or an ephemeral-service CLI must pass through this so that spaces and
/// shell metacharacters in user-controlled values (service names, workflow
/// variables, bb spec strings) cannot break out of their argument position.
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty() && value.bytes().all(is_safe_unquoted_byte) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', "'\\''"))
}

fn is_safe_unquoted_byte(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'/' | b':' | b'=')
}

/// Join already-quoted argv-style tokens with spaces, quoting each first.
pub fn shell_quote_join<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values.into_iter().map(|v| shell_quote(v.as_ref())).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "shell_quote_tests.rs"]
mod tests;
