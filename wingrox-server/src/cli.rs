use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "wingrox",
    about = "WinGrox Gateway - alias-aware community and products API",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true, env = "WINGROX_CONFIG", help = "Path to config.json")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the API server (default if no command specified)")]
    Serve {
        #[arg(short, long, help = "Override the configured port")]
        port: Option<u16>,
    },

    #[command(about = "Check every known endpoint of a running server")]
    Probe {
        #[arg(long, env = "WINGROX_PROBE_URL", help = "Server base URL, e.g. http://127.0.0.1:8080")]
        base_url: String,

        #[arg(long, help = "Also create one marker post per alias prefix")]
        include_writes: bool,

        #[arg(short, long, help = "Output as JSON")]
        json: bool,

        #[arg(long, default_value = "5000", help = "Per-endpoint timeout")]
        timeout_ms: u64,
    },

    #[command(about = "Print the route table")]
    Routes {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(subcommand, about = "View configuration")]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show the effective configuration")]
    Show {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },
}
