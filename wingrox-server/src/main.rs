//! WinGrox Server
//!
//! One HTTP server exposing community posts, segments and products under
//! every configured alias prefix (`/api/x`, `/x`, `/emergency/x`), all
//! backed by a single document store. The same binary carries the ops
//! commands: `probe`, `routes` and `config show`.

#![allow(clippy::print_stdout, reason = "CLI tool outputs to stdout")]

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod cli;
mod commands;
mod router;
mod server_utils;
mod state;
#[cfg(test)]
mod test_helpers;

use cli::{Cli, Commands};
use state::AppState;
use wingrox_core::config::{load_server_config, validate_config};
use wingrox_types::ServerConfig;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_server_config(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        None => run_server(config).await?,
        Some(Commands::Serve { port }) => {
            let mut config = config;
            if let Some(port) = port {
                config.port = port;
                validate_config(&config)?;
            }
            run_server(config).await?;
        },
        Some(Commands::Probe { base_url, include_writes, json, timeout_ms }) => {
            let passing =
                commands::handle_probe(&config, &base_url, include_writes, json, timeout_ms).await?;
            if !passing {
                return Ok(ExitCode::FAILURE);
            }
        },
        Some(Commands::Routes { json }) => commands::handle_routes(&config, json)?,
        Some(Commands::Config(cmd)) => commands::handle_config_command(&config, cmd)?,
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_server(config: ServerConfig) -> Result<()> {
    info!("🚀 WinGrox Server v{} starting", env!("CARGO_PKG_VERSION"));

    let listener = server_utils::create_listener(&config).await?;
    let state = AppState::from_config(config).await?;
    info!("✅ Application state initialized ({} store)", state.store().backend());

    let app = router::build_router(state).context("building routes")?;

    axum::serve(listener, app).with_graceful_shutdown(server_utils::shutdown_signal()).await?;
    info!("👋 Server stopped");
    Ok(())
}
