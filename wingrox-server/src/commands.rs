use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use std::time::Duration;

use wingrox_client::{default_targets, HealthProbe, ProbeReport, ProbeStatus};
use wingrox_types::ServerConfig;

use crate::cli::ConfigCommands;
use crate::router::route_table;

/// Run the probe and print the report. Returns whether every target passed.
pub async fn handle_probe(
    config: &ServerConfig,
    base_url: &str,
    include_writes: bool,
    json: bool,
    timeout_ms: u64,
) -> Result<bool> {
    let probe = HealthProbe::new(Duration::from_millis(timeout_ms))?;
    let targets = default_targets(&config.alias_prefixes, include_writes);
    let report = probe.run(base_url, &targets).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(report.is_passing())
}

fn print_report(report: &ProbeReport) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Target", "Method", "URL", "HTTP", "Latency", "Status", "Detail"]);

    for result in &report.results {
        let status = match result.status {
            ProbeStatus::ReachableWellFormed => Cell::new("OK").fg(Color::Green),
            ProbeStatus::ReachableMalformed => Cell::new("MALFORMED").fg(Color::Yellow),
            ProbeStatus::Unreachable => Cell::new("UNREACHABLE").fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(&result.name),
            Cell::new(result.method),
            Cell::new(&result.url),
            Cell::new(result.http_status.map_or_else(|| "-".to_string(), |s| s.to_string())),
            Cell::new(format!("{}ms", result.latency_ms)),
            status,
            Cell::new(result.detail.as_deref().unwrap_or("")),
        ]);
    }

    println!("{table}");
    if report.is_passing() {
        println!("\n{} {}", "✓".green(), report.summary());
    } else {
        println!("\n{} {}", "✗".red(), report.summary());
    }
}

pub fn handle_routes(config: &ServerConfig, json: bool) -> Result<()> {
    let routes = route_table(&config.alias_prefixes).context("building route table")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&routes)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Method", "Operation", "Paths"]);
    for route in &routes {
        table.add_row(vec![
            Cell::new(route.method),
            Cell::new(&route.operation),
            Cell::new(route.paths.join("\n")),
        ]);
    }
    println!("{table}");
    println!("\n{} operations, {} alias prefixes", routes.len(), config.alias_prefixes.len());
    Ok(())
}

pub fn handle_config_command(config: &ServerConfig, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show { json } => show_config(config, json),
    }
}

fn show_config(config: &ServerConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    let prefixes: Vec<String> = config
        .alias_prefixes
        .iter()
        .map(|p| if p.is_empty() { "(bare)".to_string() } else { p.clone() })
        .collect();

    println!("{}", "Server Configuration:".cyan().bold());
    println!("  Bind: {}:{}", config.host, config.port);
    println!("  Alias prefixes: {}", prefixes.join(", "));
    println!("  Store: {}", serde_json::to_string(&config.store)?);
    println!("  Seed segments: {}", config.seed_segments);
    Ok(())
}
