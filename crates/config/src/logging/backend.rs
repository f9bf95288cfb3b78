//! Process-wide logging state and how it gets replaced.
//!
//! Responsibilities:
//! - Define the `LoggingBackend` seam through which a loaded chain replaces
//!   the active logging setup.
//! - Provide `TracingBackend`, which owns a reloadable global subscriber.
//!
//! Invariants:
//! - Replacement is wholesale: the previous layer is dropped, never merged.
//! - A spec that fails to compile leaves the current setup in place.

use std::sync::{Mutex, OnceLock, PoisonError};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Registry, reload};

use super::LoggingError;
use super::layer::ChainLayer;
use super::spec::LoggingSpec;

/// Something that can take over the process-wide logging setup.
pub trait LoggingBackend: Send + Sync {
    /// Discard the current setup and install the one described by `spec`.
    fn replace(&self, spec: &LoggingSpec) -> Result<(), LoggingError>;
}

/// The global `tracing` subscriber, installed once and reloaded afterwards.
pub struct TracingBackend {
    handle: reload::Handle<ChainLayer, Registry>,
}

static BACKEND: OnceLock<TracingBackend> = OnceLock::new();
static INSTALL_LOCK: Mutex<()> = Mutex::new(());

impl TracingBackend {
    /// The installed backend, installing a silent one on first use.
    pub fn global() -> Result<&'static Self, LoggingError> {
        Self::install_with(ChainLayer::silent)
    }

    /// Install a root logger at `level` writing to stderr, used until a
    /// chain brings its own logging sections.
    ///
    /// When a backend is already installed its setup is replaced instead.
    pub fn install_bootstrap(level: LevelFilter) -> Result<&'static Self, LoggingError> {
        let spec = LoggingSpec::bootstrap(level);
        if let Some(backend) = BACKEND.get() {
            backend.replace(&spec)?;
            return Ok(backend);
        }
        let layer = ChainLayer::compile(&spec)?;
        Self::install_with(move || layer)
    }

    fn install_with(
        initial: impl FnOnce() -> ChainLayer,
    ) -> Result<&'static Self, LoggingError> {
        if let Some(backend) = BACKEND.get() {
            return Ok(backend);
        }
        let _guard = INSTALL_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(backend) = BACKEND.get() {
            return Ok(backend);
        }

        let (layer, handle) = reload::Layer::new(initial());
        tracing_subscriber::registry()
            .with(layer)
            .try_init()
            .map_err(|_| LoggingError::SubscriberInstalled)?;
        Ok(BACKEND.get_or_init(|| Self { handle }))
    }
}

impl LoggingBackend for TracingBackend {
    fn replace(&self, spec: &LoggingSpec) -> Result<(), LoggingError> {
        let layer = ChainLayer::compile(spec)?;
        self.handle
            .reload(layer)
            .map_err(|e| LoggingError::Reload(e.to_string()))
    }
}

/// Applies the logging part of a loaded chain to a backend.
pub struct LoggingReconfigurator<'a> {
    backend: &'a dyn LoggingBackend,
}

impl<'a> LoggingReconfigurator<'a> {
    pub fn new(backend: &'a dyn LoggingBackend) -> Self {
        Self { backend }
    }

    /// Replace the backend's setup when `spec` is present.
    ///
    /// Returns whether a replacement happened. Without a spec the current
    /// setup is left exactly as it was.
    pub fn apply(&self, spec: Option<&LoggingSpec>) -> Result<bool, LoggingError> {
        let Some(spec) = spec else {
            tracing::debug!("Config chain has no logging sections; keeping current logging");
            return Ok(false);
        };
        self.backend.replace(spec)?;
        tracing::debug!(
            loggers = spec.loggers.len() + 1,
            handlers = spec.handlers.len(),
            "Replaced logging configuration"
        );
        Ok(true)
    }
}
