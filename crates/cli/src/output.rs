// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text table rendering for listing commands, column widths computed
//! from the longest value in each field the way the original CLI's
//! formatter does it.

use wfm_capabilities::{Flavor, Location};
use wfm_wire::{ServiceSummary, SessionDetailedView, SessionSummary, StepStatusSummary};

fn col_width(header: &str, values: impl Iterator<Item = usize>) -> usize {
    values.fold(header.len(), usize::max)
}

pub fn print_sessions(sessions: &[SessionSummary]) {
    if sessions.is_empty() {
        println!("No session found in the WFDB");
        return;
    }
    let name_w = col_width("SESSION", sessions.iter().map(|s| s.name.len()));
    let wf_w = col_width("WORKFLOW", sessions.iter().map(|s| s.workflow_name.len()));
    let status_w = col_width("STATUS", sessions.iter().map(|s| s.status.len()));
    println!("{:<name_w$} {:<wf_w$} {:<status_w$}", "SESSION", "WORKFLOW", "STATUS");
    for s in sessions {
        println!(
            "{:<name_w$} {:<wf_w$} {:<status_w$}",
            s.name,
            s.workflow_name,
            s.status.to_lowercase()
        );
    }
}

pub fn print_steps(steps: &[StepStatusSummary]) {
    if steps.is_empty() {
        println!("Session has no active step");
        return;
    }
    let inst_w = col_width("INSTANCE", steps.iter().map(|s| s.instance.instance_name.len()));
    let status_w = col_width("STATUS", steps.iter().map(|s| s.display_status.len()));
    let progress_w = col_width("PROGRESS", steps.iter().map(|s| s.instance.progress.len()));
    println!("{:<10} {:<inst_w$} {:<status_w$} {:<10} {:<progress_w$}", "ID", "INSTANCE", "STATUS", "JOBID", "PROGRESS");
    for s in steps {
        let jobid = if s.instance.jobid > 0 { s.instance.jobid.to_string() } else { "-".to_string() };
        println!(
            "{:<10} {:<inst_w$} {:<status_w$} {:<10} {:<progress_w$}",
            s.instance.id,
            s.instance.instance_name,
            s.display_status.to_lowercase(),
            jobid,
            s.instance.progress,
        );
    }
}

pub fn print_services(services: &[ServiceSummary]) {
    if services.is_empty() {
        println!("No service found in the WFDB");
        return;
    }
    let name_w = col_width("SERVICE", services.iter().map(|s| s.name.len()));
    let type_w = col_width("TYPE", services.iter().map(|s| s.kind.len()));
    let status_w = col_width("STATUS", services.iter().map(|s| s.status.len()));
    println!("{:<name_w$} {:<type_w$} {:<status_w$}", "SERVICE", "TYPE", "STATUS");
    for s in services {
        println!("{:<name_w$} {:<type_w$} {:<status_w$}", s.name, s.kind, s.status.to_lowercase());
    }
}

pub fn print_locations(locations: &[Location]) {
    if locations.is_empty() {
        println!("No location configured");
        return;
    }
    print!("Available partitions: ");
    for l in locations {
        print!("{} ", l.name);
    }
    println!();
}

pub fn print_flavors(flavors: &[Flavor]) {
    if flavors.is_empty() {
        println!("No flavor configured");
        return;
    }
    let name_w = col_width("FLAVOR", flavors.iter().map(|f| f.name.len()));
    println!("{:<name_w$}", "FLAVOR");
    for f in flavors {
        println!("{:<name_w$}", f.name);
    }
}

pub fn print_detailed(sessions: &[SessionDetailedView]) {
    if sessions.is_empty() {
        println!("No session found in the WFM DB");
        return;
    }
    for detailed in sessions {
        println!(
            "{} ({}) [{}]",
            detailed.session.name,
            detailed.session.workflow_name,
            detailed.session.status.to_lowercase()
        );
        for service in &detailed.services {
            println!("  service {} [{}] status={}", service.name, service.kind, service.status.to_lowercase());
        }
        for step in &detailed.step_descriptions {
            println!("  step {}: {}", step.name, step.command);
        }
    }
}
