//! Configuration inspection commands.
//!
//! Every command works on the chain rooted at the `-c/--config` file, which
//! `main` has already loaded (including logging re-application). `chain`
//! resolves the files again to list them.

use anyhow::{Context, Result};
use ckan_config::{ConfigLoader, MergedConfig};
use clap::Subcommand;
use std::path::Path;
use tracing::debug;

use crate::formatters::{OutputFormat, get_formatter};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the merged configuration
    Show {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the value of one key
    Get {
        /// Key to look up, e.g. ckan.site_url
        key: String,
    },

    /// Print the files of the chain, base-most first
    Chain {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

pub fn run(command: ConfigCommand, path: &Path, config: &MergedConfig) -> Result<()> {
    debug!(config = %path.display(), "Running config command");

    match command {
        ConfigCommand::Show { format } => {
            let format = OutputFormat::from_str(&format)?;
            print!("{}", get_formatter(format).format_config(config)?);
        }
        ConfigCommand::Get { key } => {
            println!("{}", config.require(&key)?);
        }
        ConfigCommand::Chain { format } => {
            let format = OutputFormat::from_str(&format)?;
            let chain = ConfigLoader::new(path)
                .resolve_chain()
                .context("Failed to resolve configuration chain")?;
            let files: Vec<&Path> = chain.paths().collect();
            print!("{}", get_formatter(format).format_chain(&files)?);
        }
    }

    Ok(())
}
