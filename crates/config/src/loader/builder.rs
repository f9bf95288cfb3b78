//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader`, the single entry point for
//!   loading a chained configuration.
//! - Orchestrate chain resolution, per-file interpolation, the override
//!   merge, and logging re-application, in that order.
//!
//! Does NOT handle:
//! - Parsing `use` directives or walking the chain (delegated to chain.rs).
//! - Placeholder substitution (delegated to interpolate.rs).
//! - Building `tracing` layers (delegated to the logging module).
//!
//! Invariants / Assumptions:
//! - Every failure surfaces as one `ConfigurationError` naming the file at
//!   fault; no partial configuration is returned.
//! - The environment is snapshotted once per load unless an explicit
//!   `EnvironmentView` was supplied.
//! - Logging is replaced only after the whole chain resolved and merged.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::chain::{Chain, ChainResolver};
use super::env::EnvironmentView;
use super::error::{ConfigError, ConfigurationError};
use super::interpolate::{FileInterpolator, LoggingSections};
use super::merge::ChainMerger;
use crate::constants::{DEFAULT_ENV_PREFIX, DEFAULT_MAIN_SECTION};
use crate::logging::{LoggingBackend, LoggingReconfigurator, LoggingSpec, TracingBackend};
use crate::types::MergedConfig;

/// Where the logging part of a loaded chain goes.
#[derive(Clone, Default)]
enum LoggingTarget {
    #[default]
    Global,
    Backend(Arc<dyn LoggingBackend>),
    Disabled,
}

/// Loads a chained configuration starting from a root file.
#[derive(Clone)]
pub struct ConfigLoader {
    path: PathBuf,
    main_section: String,
    env_prefix: String,
    environment: Option<EnvironmentView>,
    logging: LoggingTarget,
    inherited_interpolation: bool,
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let logging = match self.logging {
            LoggingTarget::Global => "global",
            LoggingTarget::Backend(_) => "custom",
            LoggingTarget::Disabled => "disabled",
        };
        f.debug_struct("ConfigLoader")
            .field("path", &self.path)
            .field("main_section", &self.main_section)
            .field("env_prefix", &self.env_prefix)
            .field("logging", &logging)
            .field("inherited_interpolation", &self.inherited_interpolation)
            .finish()
    }
}

impl ConfigLoader {
    /// Create a loader for the chain rooted at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            main_section: DEFAULT_MAIN_SECTION.to_string(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            environment: None,
            logging: LoggingTarget::default(),
            inherited_interpolation: false,
        }
    }

    /// The requested root path, as given.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read values from `section` instead of `app:main`.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.main_section = section.into();
        self
    }

    /// Expose environment variables carrying `prefix` instead of `CKAN_`.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Use a fixed environment view instead of snapshotting the process
    /// environment. Takes precedence over [`ConfigLoader::with_env_prefix`].
    pub fn with_environment(mut self, environment: EnvironmentView) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Send the chain's logging setup to `backend` instead of the global
    /// `tracing` subscriber.
    pub fn with_logging_backend(mut self, backend: Arc<dyn LoggingBackend>) -> Self {
        self.logging = LoggingTarget::Backend(backend);
        self
    }

    /// Validate logging sections but never apply them.
    pub fn without_logging(mut self) -> Self {
        self.logging = LoggingTarget::Disabled;
        self
    }

    /// Let placeholders that a file cannot resolve fall back to the values
    /// already merged from more-base files before the environment.
    pub fn with_inherited_interpolation(mut self, enabled: bool) -> Self {
        self.inherited_interpolation = enabled;
        self
    }

    /// Resolve and parse the chain without interpolating or merging it.
    pub fn resolve_chain(&self) -> Result<Chain, ConfigurationError> {
        ChainResolver::new(&self.main_section).resolve(&self.path)
    }

    /// Load the chain and return the merged configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` when the chain is malformed, cyclic or
    /// incomplete, when a placeholder cannot be resolved, or when the
    /// logging sections are invalid or cannot be applied.
    pub fn load(&self) -> Result<MergedConfig, ConfigurationError> {
        let chain = self.resolve_chain()?;
        let root_path = chain.root().path().to_path_buf();
        let env = self.environment();

        let mut merger = ChainMerger::new();
        for file in chain.files() {
            let interpolator = FileInterpolator::new(&env, &self.main_section, &root_path);
            let resolved = if self.inherited_interpolation {
                interpolator.with_inherited(merger.values()).resolve(file)?
            } else {
                interpolator.resolve(file)?
            };
            merger.push(resolved);
        }
        let merged = merger.finish(&root_path);

        self.apply_logging(&merged.logging)
            .map_err(|e| ConfigurationError::new(&root_path, e))?;

        debug!(
            root = %root_path.display(),
            files = chain.len(),
            keys = merged.config.len(),
            "Loaded config chain"
        );
        Ok(merged.config)
    }

    fn environment(&self) -> Cow<'_, EnvironmentView> {
        match &self.environment {
            Some(view) => Cow::Borrowed(view),
            None => Cow::Owned(EnvironmentView::from_env(self.env_prefix.as_str())),
        }
    }

    fn apply_logging(&self, sections: &LoggingSections) -> Result<(), ConfigError> {
        let spec = LoggingSpec::from_sections(sections)?;
        let backend: &dyn LoggingBackend = match &self.logging {
            LoggingTarget::Disabled => return Ok(()),
            LoggingTarget::Backend(backend) => backend.as_ref(),
            // Nothing to apply: do not install a global subscriber just to leave it alone.
            LoggingTarget::Global if spec.is_none() => return Ok(()),
            LoggingTarget::Global => TracingBackend::global()?,
        };
        LoggingReconfigurator::new(backend).apply(spec.as_ref())?;
        Ok(())
    }
}

/// Load the chain rooted at `path` with default settings.
pub fn load_config(path: impl Into<PathBuf>) -> Result<MergedConfig, ConfigurationError> {
    ConfigLoader::new(path).load()
}
