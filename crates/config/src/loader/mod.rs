//! Chained configuration loading.
//!
//! Responsibilities:
//! - Resolve a chain of INI files connected by `use = config:...` directives.
//! - Interpolate each file in its own scope (`here`, defaults, environment).
//! - Fold the chain into one `MergedConfig`, nearer files winning.
//! - Hand the chain's logging sections to the logging module.
//!
//! Does NOT handle:
//! - INI syntax (see ini.rs).
//! - Building or installing `tracing` layers (see the logging module).
//!
//! Invariants / Assumptions:
//! - Values from different files meet only after each file is fully resolved.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

mod builder;
mod chain;
mod env;
mod error;
mod interpolate;
mod merge;

pub use builder::{ConfigLoader, load_config};
pub use chain::{Chain, ChainResolver, ConfigFile, Directive, parse_directive};
pub use env::{EnvironmentView, env_var_or_none, load_dotenv};
pub use error::{ConfigError, ConfigurationError};
pub use interpolate::{FileInterpolator, LoggingSections, ResolvedFileMapping, is_logging_section};
pub use merge::{ChainMerger, MergedChain, merge};

#[cfg(test)]
mod tests;
