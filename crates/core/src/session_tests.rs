// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn session_id_round_trips_through_string() {
    let id = SessionId::from_string("ses-abc123");
    assert_eq!(id.as_str(), "ses-abc123");
}

#[test]
fn session_id_display_matches_as_str() {
    let id = SessionId::new();
    assert_eq!(id.to_string(), id.as_str());
    assert!(id.as_str().starts_with(SessionId::PREFIX));
}

#[test]
fn session_id_serde_round_trip() {
    let id = SessionId::new();
    let json = serde_json::to_string(&id).unwrap();
    let parsed: SessionId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn new_session_starts_in_starting_status() {
    let session = Session::new("wf0", "workflow0", "alice", 1_000);
    assert_eq!(session.status, SessionStatus::Starting);
    assert!(session.end_ts.is_none());
}

#[test]
fn session_status_display() {
    assert_eq!(SessionStatus::Active.to_string(), "active");
    assert_eq!(SessionStatus::Teardown.to_string(), "teardown");
}

#[test]
fn only_stopped_is_terminal() {
    assert!(SessionStatus::Stopped.is_terminal());
    assert!(!SessionStatus::Teardown.is_terminal());
    assert!(!SessionStatus::Active.is_terminal());
}
