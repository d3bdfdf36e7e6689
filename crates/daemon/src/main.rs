// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! wfmd entry point: load settings, wire the capability implementations,
//! install structured logging and serve the HTTP surface (spec.md §6, §9).

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use wfm_daemon::{build_router, AppState, WfmSettings};

fn init_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let log_dir = std::env::var("WFM_LOG_DIR").unwrap_or_else(|_| ".".to_string());
    let file_appender = tracing_appender::rolling::daily(log_dir, "wfmd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = init_logging();

    let settings = WfmSettings::from_env()?;
    tracing::info!(bind_addr = %settings.bind_addr, "starting wfmd");

    let state = AppState::from_settings(&settings);
    let router = build_router(state);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
