//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//! - Provide config path resolution helpers.
//!
//! Non-responsibilities:
//! - Does not execute commands (see the `commands` module).
//! - Does not load configuration (see `ckan_config::ConfigLoader`).

use ckan_config::constants::CONFIG_PATH_ENV;
use ckan_config::env_var_or_none;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

use crate::commands::ConfigCommand;

#[derive(Parser)]
#[command(name = "ckan")]
#[command(about = "CKAN command line interface", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  \
        ckan -c /etc/ckan/default/ckan.ini config show\n  \
        ckan -c production.ini config get ckan.site_url\n  \
        CKAN_INI=production.ini ckan config chain\n"
)]
pub struct Cli {
    /// Path to the root configuration file.
    ///
    /// Falls back to the CKAN_INI environment variable when not given.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity until the configuration provides its own logging (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect the loaded configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

impl Cli {
    /// The root file from `-c/--config`, else from `CKAN_INI`. Blank values
    /// count as unset.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.resolve_config_path(env_var_or_none(CONFIG_PATH_ENV))
    }

    fn resolve_config_path(&self, from_env: Option<String>) -> Option<PathBuf> {
        self.config
            .clone()
            .filter(|path| !path.to_string_lossy().trim().is_empty())
            .or_else(|| from_env.map(PathBuf::from))
    }

    /// Level of the bootstrap logger.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
