//! Logging sub-configuration carried by a config chain.
//!
//! A chain may contain `[loggers]`, `[handlers]` and `[formatters]` sections
//! in the Python `fileConfig` layout. After a load they are turned into a
//! [`LoggingSpec`] and, when present, replace the process-wide `tracing`
//! setup wholesale through a [`LoggingBackend`].

mod backend;
mod format;
mod layer;
mod spec;

use std::path::PathBuf;

use thiserror::Error;

pub use backend::{LoggingBackend, LoggingReconfigurator, TracingBackend};
pub use format::{LogFormat, Record, level_name};
pub use layer::ChainLayer;
pub use spec::{FormatterSpec, HandlerSpec, HandlerTarget, LoggerSpec, LoggingSpec, parse_level};

/// Errors from building or installing a logging setup.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("[loggers] must list the root logger")]
    MissingRootLogger,

    #[error("Missing logging section [{0}]")]
    MissingSection(String),

    #[error("Logger {logger:?} references unknown handler {handler:?}")]
    UnknownHandler { logger: String, handler: String },

    #[error("Handler {handler:?} references unknown formatter {formatter:?}")]
    UnknownFormatter { handler: String, formatter: String },

    #[error("Invalid log level {0:?}")]
    InvalidLevel(String),

    #[error("Unsupported handler class {class:?} for handler {handler:?}")]
    UnsupportedHandlerClass { handler: String, class: String },

    #[error("Handler {handler:?} has invalid args {args:?}")]
    InvalidHandlerArgs { handler: String, args: String },

    #[error("Invalid format in formatter {formatter:?}: {message}")]
    InvalidFormat { formatter: String, message: String },

    #[error("Failed to open log file {}: {source}", path.display())]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A global tracing subscriber is already installed")]
    SubscriberInstalled,

    #[error("Failed to reload logging configuration: {0}")]
    Reload(String),
}
