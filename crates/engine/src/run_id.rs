// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run-id construction (spec.md §4.G.1 step 7, GLOSSARY): a correlation tag
//! for observability in the job manager, `{session}-{start_time}` with the
//! timestamp formatted `YYYY-MM-DD_HH:MM:SS` in local time.

use chrono::{Local, TimeZone};

pub fn build_run_id(session_name: &str, start_ts_epoch_ms: u64) -> String {
    let formatted = Local
        .timestamp_millis_opt(start_ts_epoch_ms as i64)
        .single()
        .unwrap_or_else(Local::now)
        .format("%Y-%m-%d_%H:%M:%S");
    format!("{session_name}-{formatted}")
}

#[cfg(test)]
#[path = "run_id_tests.rs"]
mod tests;
