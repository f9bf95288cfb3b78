//! Subcommand implementations.

pub mod config;

pub use config::ConfigCommand;
