//! CKAN CLI - command-line interface for a CKAN site's configuration.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Install bootstrap logging, then load the configuration chain.
//! - Print configuration values in the requested format.
//!
//! Does NOT handle:
//! - Chain resolution, interpolation, or logging setup (see `crates/config`).
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing so `.env` can provide `CKAN_INI`.
//! - A given config file is loaded exactly once, before any command or help runs.
//! - Logging sections in the loaded chain replace the bootstrap logger.

mod args;
mod commands;
mod error;
mod formatters;

use anyhow::anyhow;
use args::{Cli, Commands};
use ckan_config::{ConfigLoader, TracingBackend, load_dotenv};
use clap::{CommandFactory, Parser};
use error::{ExitCode, ExitCodeExt, startup_report};

fn main() {
    // Load .env file first so CKAN_INI can come from it
    if let Err(e) = load_dotenv() {
        eprintln!("Failed to load environment: {}", e);
        std::process::exit(ExitCode::GeneralError.as_i32());
    }

    let cli = Cli::parse();

    if let Err(e) = TracingBackend::install_bootstrap(cli.log_level()) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(ExitCode::GeneralError.as_i32());
    }

    // A given config is loaded before anything else, help included, so a
    // broken chain is reported even when no command runs.
    let config_path = cli.config_path();
    let loaded = match &config_path {
        Some(path) => match ConfigLoader::new(path).load() {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("{}", startup_report(&e));
                std::process::exit(ExitCode::ConfigError.as_i32());
            }
        },
        None => None,
    };

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        std::process::exit(ExitCode::Success.as_i32());
    };

    let result = match (config_path, loaded) {
        (Some(path), Some(config)) => match command {
            Commands::Config { command } => commands::config::run(command, &path, &config),
        },
        _ => Err(anyhow!(
            "No configuration file given. Use -c/--config or set CKAN_INI"
        )),
    };

    let exit_code = match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("{:#}", e);
            e.exit_code()
        }
    };

    std::process::exit(exit_code.as_i32());
}
