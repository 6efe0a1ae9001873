//! Message Relay Command Line Interface
//!
//! Drives a relay instance persisted in a local sled database. Every
//! invocation acts as one caller (`--from`) performing one operation.

mod commands;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use commands::Commands;
use crate::config::AppConfig;
use relay_core::SledStateStore;
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Message Relay Command Line Interface", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory of the state database (overrides `state_path`)
    #[arg(long, global = true, value_name = "PATH")]
    state: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(state) = cli.state {
        config.state_path = state;
    }
    init_logging(&config);

    let store = SledStateStore::open(&config.state_path).with_context(|| {
        format!(
            "failed to open state store at {}",
            config.state_path.display()
        )
    })?;

    let output = commands::execute(&cli.command, &store, &config.relay)?;
    print_output(&output)
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // Logs go to stderr so stdout carries only command output.
    if config.log_format == "plain" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}

fn print_output(output: &Value) -> Result<()> {
    match output {
        Value::Array(items) => {
            for item in items {
                println!("{}", serde_json::to_string(item)?);
            }
        }
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}
