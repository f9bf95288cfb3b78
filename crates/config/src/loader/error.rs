//! Error types for configuration loading.
//!
//! Responsibilities:
//! - Define one variant per way a chained load can fail.
//! - Wrap every failure in `ConfigurationError`, which names the file at fault.
//!
//! Does NOT handle:
//! - Formatting for end users or exit codes (see the CLI crate).
//!
//! Invariants:
//! - Every variant carries enough context to locate the problem (directive
//!   text, paths, section/option/reference names, line numbers).
//! - Errors abort the whole load; no partial configuration is ever returned.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::logging::LoggingError;

/// Errors that can occur while resolving, interpolating, or applying a chain.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Malformed `use` directive {value:?}: expected `scheme:reference`")]
    MalformedDirective { value: String },

    #[error("Cyclic config chain: {} is already part of the chain", path.display())]
    CyclicChain { path: PathBuf },

    #[error("{}", missing_file_message(path, referenced_by.as_deref()))]
    MissingChainFile {
        path: PathBuf,
        referenced_by: Option<PathBuf>,
    },

    #[error(
        "Bad value substitution: option {option:?} in section [{section}] references {reference:?}, \
         which is not defined in the same file or as an environment variable"
    )]
    InterpolationMissingOption {
        section: String,
        option: String,
        reference: String,
    },

    #[error("Invalid interpolation syntax in option {option:?} of section [{section}]: {message}")]
    InterpolationSyntax {
        section: String,
        option: String,
        message: String,
    },

    #[error("Failed to parse config file at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Failed to read config file: {0}")]
    Read(#[source] std::io::Error),

    #[error("Invalid logging configuration: {0}")]
    Logging(#[from] LoggingError),

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: Only the byte index is reported, never the offending line,
    /// so secrets in `.env` files cannot leak into logs.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: std::io::ErrorKind },

    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}

fn missing_file_message(path: &Path, referenced_by: Option<&Path>) -> String {
    match referenced_by {
        Some(parent) => format!(
            "Config file not found: {} (referenced by {})",
            path.display(),
            parent.display()
        ),
        None => format!("Config file not found: {}", path.display()),
    }
}

impl From<crate::ini::IniError> for ConfigError {
    fn from(error: crate::ini::IniError) -> Self {
        ConfigError::Parse {
            line: error.line,
            message: error.message,
        }
    }
}

/// The single error type surfaced by [`crate::ConfigLoader::load`].
///
/// `path` is the file at fault: the referencing file for chain errors, the
/// defining file for interpolation errors, and the root file for logging
/// errors.
#[derive(Error, Debug)]
#[error("Configuration error in {}", path.display())]
pub struct ConfigurationError {
    pub path: PathBuf,
    #[source]
    pub source: ConfigError,
}

impl ConfigurationError {
    pub fn new(path: impl Into<PathBuf>, source: ConfigError) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    /// The file the failure is attributed to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying cause.
    pub fn kind(&self) -> &ConfigError {
        &self.source
    }
}
