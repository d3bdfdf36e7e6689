// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-path assembly shapes (spec.md §6): a session together with its
//! services and step descriptions, as returned by start-session and the
//! session listing endpoints.

use wfm_core::{Service, Session, StepDescription};

#[derive(Debug, Clone)]
pub struct SessionDetailed {
    pub session: Session,
    pub services: Vec<Service>,
    pub step_descriptions: Vec<StepDescription>,
}
