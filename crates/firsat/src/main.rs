// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operational CLI for the Firsat deal pipeline.
//!
//! The ingestion and fan-out runners are library APIs wired up by the
//! deployment harness that links the concrete document store, channel,
//! and push transports. This binary covers the operational side: config
//! inspection and preflight checks.

mod doctor;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use firsat_config::load_and_validate;

#[derive(Parser)]
#[command(name = "firsat", version, about = "Firsat deal pipeline tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the resolved configuration and report channel identities.
    Doctor,
    /// Print the resolved, merged configuration as TOML.
    Config,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), firsat_core::FirsatError> {
    let config = load_and_validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.ingest.log_level.clone())),
        )
        .init();

    match cli.command {
        Command::Doctor => doctor::run(&config),
        Command::Config => {
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| firsat_core::FirsatError::Internal(e.to_string()))?;
            println!("{rendered}");
            Ok(())
        }
    }
}
