// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! wfm: the Workflow Manager command-line client (spec.md §2 component I,
//! §6 "CLI surface"). Issues HTTP requests against the daemon and formats
//! listings; all orchestration logic lives server-side.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod output;
mod variables;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use client::WfmClient;
use variables::{parse_define, to_replacements};

#[derive(Parser)]
#[command(name = "wfm", version, about = "Workflow Manager command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Starts a session from a workflow description file
    Start(StartArgs),
    /// Stops a session
    Stop(StopArgs),
    /// Runs a step inside a session
    Run(RunArgs),
    /// Gets access to a session, using a given ephemeral service
    Access(AccessArgs),
    /// Returns object status
    Status(StatusArgs),
    /// Shows various configuration settings
    Show(ShowArgs),
    /// Updates the job progress of a step instance
    #[command(hide = true)]
    Update(UpdateArgs),
}

#[derive(clap::Args)]
struct StartArgs {
    /// Workflow description file path
    #[arg(short = 'w', long = "workflowfile")]
    workflowfile: PathBuf,
    /// The session name
    #[arg(short = 's', long = "session")]
    session: String,
    /// Start the services synchronously
    #[arg(short = 'S', long = "syncstart")]
    syncstart: bool,
    /// A variable definition (var=val), may be repeated
    #[arg(short = 'd', long = "define", value_parser = parse_define)]
    define: Vec<(String, String)>,
}

#[derive(clap::Args)]
struct StopArgs {
    /// The session name
    #[arg(short = 's', long = "session")]
    session: String,
    /// Stop the services synchronously
    #[arg(short = 'S', long = "syncstop")]
    syncstop: bool,
    /// Force the stop even if steps haven't reached a stoppable state
    #[arg(short = 'f', long = "force")]
    force: bool,
}

#[derive(clap::Args)]
struct RunArgs {
    /// The session name
    #[arg(short = 's', long = "session")]
    session: String,
    /// The step name
    #[arg(short = 't', long = "step")]
    step: String,
    /// A variable definition (var=val), may be repeated
    #[arg(short = 'd', long = "define", value_parser = parse_define)]
    define: Vec<(String, String)>,
}

#[derive(clap::Args)]
struct AccessArgs {
    /// The session name
    #[arg(short = 's', long = "session")]
    session: String,
    /// An ephemeral service to use for the access (repeatable; omit for "use all")
    #[arg(short = 'S', long = "service")]
    service: Vec<String>,
}

#[derive(clap::Args)]
struct StatusArgs {
    /// Status for all sessions
    #[arg(short = 'a', long = "allsessions", conflicts_with_all = ["session", "allservices", "service"])]
    allsessions: bool,
    /// Status for this session name
    #[arg(short = 's', long = "session", conflicts_with_all = ["allservices", "service"])]
    session: Option<String>,
    /// Status for this step within --session
    #[arg(short = 't', long = "step", conflicts_with = "allsteps", requires = "session")]
    step: Option<String>,
    /// Status for every step of --session
    #[arg(short = 'T', long = "allsteps", requires = "session")]
    allsteps: bool,
    /// Status for all services
    #[arg(short = 'A', long = "allservices")]
    allservices: bool,
    /// Status for this service name
    #[arg(short = 'S', long = "service")]
    service: Option<String>,
}

#[derive(clap::Args)]
struct ShowArgs {
    /// Show the list of the configured locations
    #[arg(short = 'l', long = "locations", conflicts_with = "flavors")]
    locations: bool,
    /// Show the list of the available flavors
    #[arg(short = 'f', long = "flavors")]
    flavors: bool,
}

#[derive(clap::Args)]
struct UpdateArgs {
    /// The step instance jobid
    #[arg(short = 'j', long = "jobid")]
    jobid: i64,
    /// The step new progress value (free string)
    #[arg(short = 'p', long = "progress")]
    progress: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = WfmClient::from_env();

    match cli.command {
        Command::Start(args) => start(&client, args).await,
        Command::Stop(args) => stop(&client, args).await,
        Command::Run(args) => run_step(&client, args).await,
        Command::Access(args) => access(&client, args).await,
        Command::Status(args) => status(&client, args).await,
        Command::Show(args) => show(&client, args).await,
        Command::Update(args) => update(&client, args).await,
    }
}

async fn start(client: &WfmClient, args: StartArgs) -> Result<()> {
    let workflow_description = std::fs::read_to_string(&args.workflowfile)
        .with_context(|| format!("cannot read workflow file '{}'", args.workflowfile.display()))?;
    let workflow_description_file = args.workflowfile.to_string_lossy().into_owned();
    let replacements = to_replacements(&args.define);

    client
        .start_session(workflow_description_file, workflow_description, args.session.clone(), args.syncstart, replacements)
        .await?;

    if args.syncstart {
        println!("Successfully started session {}", args.session);
    } else {
        println!("Check session {} status before starting any step", args.session);
    }
    Ok(())
}

async fn stop(client: &WfmClient, args: StopArgs) -> Result<()> {
    client.stop_session(args.session.clone(), args.syncstop, args.force).await?;
    if args.syncstop {
        println!("Successfully stopped session {}", args.session);
    } else {
        println!("Clean (wfm status) the stopped session {} before reusing its name", args.session);
    }
    Ok(())
}

async fn run_step(client: &WfmClient, args: RunArgs) -> Result<()> {
    let replacements = to_replacements(&args.define);
    let result = client.start_step(args.session.clone(), args.step.clone(), replacements).await?;
    println!("Successfully submitted {} step: {}", args.step, result.instance_name);
    Ok(())
}

async fn access(client: &WfmClient, args: AccessArgs) -> Result<()> {
    if args.service.len() > 1 {
        bail!("using several services is not supported yet");
    }
    let command = client.access_session(args.session.clone(), args.service).await?;
    println!("Type the following command in order to get access to session {}:", args.session);
    println!("      {command}");
    println!("Then type ^D to exit");
    Ok(())
}

async fn status(client: &WfmClient, args: StatusArgs) -> Result<()> {
    if args.allsessions {
        let sessions = client.sessions_all().await?;
        output::print_sessions(&sessions);
    } else if let Some(session) = args.session {
        if args.allsteps {
            let steps = client.step_status(&session, None).await?;
            output::print_steps(&steps);
        } else if let Some(step) = args.step {
            let steps = client.step_status(&session, Some(&step)).await?;
            output::print_steps(&steps);
        } else {
            let sessions = client.session_by_name(&session).await?;
            output::print_sessions(&sessions);
        }
    } else if args.allservices {
        let services = client.services_all().await?;
        output::print_services(&services);
    } else if let Some(service) = args.service {
        let service = client.service_by_name(&service).await?;
        output::print_services(std::slice::from_ref(&service));
    } else {
        let sessions = client.sessions_all_detailed().await?;
        output::print_detailed(&sessions);
    }
    Ok(())
}

async fn show(client: &WfmClient, args: ShowArgs) -> Result<()> {
    if args.locations {
        let locations = client.locations().await?;
        output::print_locations(&locations);
    } else if args.flavors {
        let flavors = client.flavors().await?;
        output::print_flavors(&flavors);
    } else {
        bail!("specify either --locations or --flavors");
    }
    Ok(())
}

async fn update(client: &WfmClient, args: UpdateArgs) -> Result<()> {
    let instance_name = client.update_step_progress(args.jobid, args.progress.clone()).await?;
    println!("Successfully updated progress for job {} (step instance {instance_name})", args.jobid);
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
