//! Environment variable access for configuration.
//!
//! Responsibilities:
//! - Provide `EnvironmentView`, the prefix-filtered fallback source for
//!   interpolation placeholders.
//! - Provide helper functions for reading env vars with empty/whitespace filtering.
//! - Load an optional `.env` file before the environment is snapshotted.
//!
//! Does NOT handle:
//! - Placeholder parsing or substitution (see interpolate.rs).
//!
//! Invariants:
//! - Only variables whose name starts with the prefix (case-sensitive) are visible.
//! - Lookups use the name without the prefix; the suffix matches case-insensitively
//!   because configparser lowercases reference names.
//! - A view is a snapshot: later changes to the process environment are not seen.

use std::collections::BTreeMap;

use super::error::ConfigError;
use crate::constants::{DEFAULT_ENV_PREFIX, DOTENV_DISABLED_ENV};

/// Read-only view of the environment variables carrying a fixed prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentView {
    prefix: String,
    /// Keyed by the variable name with the prefix removed.
    vars: BTreeMap<String, String>,
}

impl Default for EnvironmentView {
    fn default() -> Self {
        Self::empty(DEFAULT_ENV_PREFIX)
    }
}

impl EnvironmentView {
    /// A view with no visible variables.
    pub fn empty(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            vars: BTreeMap::new(),
        }
    }

    /// Snapshot the process environment. Non-UTF-8 variables are skipped.
    pub fn from_env(prefix: impl Into<String>) -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        Self::from_vars(prefix, vars)
    }

    /// Build a view from explicit name/value pairs, applying the same prefix filter.
    pub fn from_vars<I, K, V>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let prefix = prefix.into();
        let vars = vars
            .into_iter()
            .filter_map(|(name, value)| {
                let suffix = name.as_ref().strip_prefix(prefix.as_str())?;
                if suffix.is_empty() {
                    return None;
                }
                Some((suffix.to_string(), value.into()))
            })
            .collect();
        Self { prefix, vars }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Look up `name` as if it were `<prefix><name>`.
    pub fn get(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.vars.get(name) {
            return Some(value);
        }
        self.vars
            .iter()
            .find(|(suffix, _)| suffix.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            // No trimming needed, return original to avoid allocation
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Check if dotenv loading is disabled via environment variable.
fn dotenv_disabled() -> bool {
    matches!(
        std::env::var(DOTENV_DISABLED_ENV).ok().as_deref(),
        Some("true") | Some("1")
    )
}

/// Load environment variables from a `.env` file in the current directory.
///
/// Missing `.env` files are silently ignored. Setting `DOTENV_DISABLED` to
/// `1` or `true` skips loading entirely (useful for testing).
///
/// # Errors
///
/// - `ConfigError::DotenvParse` when the file has invalid syntax.
/// - `ConfigError::DotenvIo` when the file exists but cannot be read.
///
/// SAFETY: Error messages never include raw .env line contents to prevent secret leakage.
pub fn load_dotenv() -> Result<(), ConfigError> {
    if dotenv_disabled() {
        return Ok(());
    }

    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if is_not_found(&e) => Ok(()),
        Err(dotenvy::Error::LineParse(_, idx)) => {
            Err(ConfigError::DotenvParse { error_index: idx })
        }
        Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
            kind: io_err.kind(),
        }),
        Err(_) => Err(ConfigError::DotenvUnknown),
    }
}

fn is_not_found(err: &dotenvy::Error) -> bool {
    matches!(
        err,
        dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
    )
}
