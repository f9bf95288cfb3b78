//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map configuration and lookup errors to appropriate exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit codes 1-9 are reserved for specific error categories.

use ckan_config::{ConfigurationError, LookupError};

/// Structured exit codes for the `ckan` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// Configuration error - the chain could not be resolved, interpolated,
    /// or its logging applied.
    ///
    /// Scripts should fix the configuration files, not retry.
    ConfigError = 2,

    /// Key not found - the requested key is absent from the merged configuration.
    NotFound = 4,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Extract the appropriate exit code from this error.
    ///
    /// Returns ExitCode::GeneralError for errors this CLI does not classify.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if cause.downcast_ref::<ConfigurationError>().is_some() {
                return ExitCode::ConfigError;
            }
            if let Some(LookupError::MissingKey(_)) = cause.downcast_ref::<LookupError>() {
                return ExitCode::NotFound;
            }
        }
        ExitCode::GeneralError
    }
}

/// Message printed when the configuration fails to load at startup.
///
/// Leads with the cause so the first line says what went wrong; the file
/// at fault follows on its own line.
pub fn startup_report(err: &ConfigurationError) -> String {
    format!("{}\n  while loading {}", err.kind(), err.path().display())
}
