//! Logging sub-configuration extracted from a chain.
//!
//! Responsibilities:
//! - Turn merged `[loggers]`/`[handlers]`/`[formatters]` sections (Python
//!   `fileConfig` layout) into a validated `LoggingSpec`.
//! - Parse level names and handler classes/arguments.
//!
//! Does NOT handle:
//! - Building or installing `tracing` layers (see layer.rs and backend.rs).
//!
//! Invariants:
//! - A spec exists only when the chain has a `[loggers]` section.
//! - Every handler and formatter a spec references is defined in it.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::level_filters::LevelFilter;

use super::LoggingError;
use super::format::LogFormat;
use crate::constants::{
    BOOTSTRAP_LOG_FORMAT, FORMATTERS_SECTION, FORMATTER_SECTION_PREFIX, HANDLERS_SECTION,
    HANDLER_SECTION_PREFIX, LOGGERS_SECTION, LOGGER_SECTION_PREFIX, ROOT_LOGGER,
};
use crate::loader::LoggingSections;

/// One `[logger_<key>]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerSpec {
    pub key: String,
    /// Dotted target prefix this logger applies to; empty for root.
    pub qualname: String,
    /// `None` (NOTSET) defers to the nearest ancestor.
    pub level: Option<LevelFilter>,
    pub handlers: Vec<String>,
    pub propagate: bool,
}

/// Where a handler writes formatted records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerTarget {
    Stderr,
    Stdout,
    File { path: PathBuf, append: bool },
    Null,
}

/// One `[handler_<key>]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSpec {
    pub key: String,
    pub target: HandlerTarget,
    pub level: LevelFilter,
    pub formatter: Option<String>,
}

/// One `[formatter_<key>]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterSpec {
    pub key: String,
    pub format: String,
    pub datefmt: Option<String>,
}

/// Complete, validated logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSpec {
    pub root: LoggerSpec,
    pub loggers: Vec<LoggerSpec>,
    pub handlers: BTreeMap<String, HandlerSpec>,
    pub formatters: BTreeMap<String, FormatterSpec>,
}

impl LoggingSpec {
    /// Build a spec from merged logging sections; `Ok(None)` without `[loggers]`.
    pub fn from_sections(sections: &LoggingSections) -> Result<Option<Self>, LoggingError> {
        let Some(loggers_section) = sections.get(LOGGERS_SECTION) else {
            return Ok(None);
        };

        let formatters = keys_of(sections.get(FORMATTERS_SECTION))
            .into_iter()
            .map(|key| {
                let name = format!("{FORMATTER_SECTION_PREFIX}{key}");
                let section = sections
                    .get(&name)
                    .ok_or(LoggingError::MissingSection(name))?;
                let spec = FormatterSpec {
                    key: key.clone(),
                    format: section
                        .get("format")
                        .cloned()
                        .unwrap_or_else(|| crate::constants::DEFAULT_LOG_FORMAT.to_string()),
                    datefmt: section.get("datefmt").filter(|d| !d.is_empty()).cloned(),
                };
                LogFormat::parse(&spec.format, spec.datefmt.as_deref()).map_err(|message| {
                    LoggingError::InvalidFormat {
                        formatter: key.clone(),
                        message,
                    }
                })?;
                Ok((key, spec))
            })
            .collect::<Result<BTreeMap<_, _>, LoggingError>>()?;

        let handlers = keys_of(sections.get(HANDLERS_SECTION))
            .into_iter()
            .map(|key| {
                let name = format!("{HANDLER_SECTION_PREFIX}{key}");
                let section = sections
                    .get(&name)
                    .ok_or(LoggingError::MissingSection(name))?;
                let spec = parse_handler(&key, section)?;
                if let Some(formatter) = &spec.formatter {
                    if !formatters.contains_key(formatter) {
                        return Err(LoggingError::UnknownFormatter {
                            handler: key.clone(),
                            formatter: formatter.clone(),
                        });
                    }
                }
                Ok((key, spec))
            })
            .collect::<Result<BTreeMap<_, _>, LoggingError>>()?;

        let logger_keys = keys_of(Some(loggers_section));
        if !logger_keys.iter().any(|k| k == ROOT_LOGGER) {
            return Err(LoggingError::MissingRootLogger);
        }

        let mut root = None;
        let mut loggers = Vec::new();
        for key in logger_keys {
            let name = format!("{LOGGER_SECTION_PREFIX}{key}");
            let section = sections
                .get(&name)
                .ok_or(LoggingError::MissingSection(name))?;
            let logger = parse_logger(&key, section)?;
            if let Some(unknown) = logger.handlers.iter().find(|h| !handlers.contains_key(*h)) {
                return Err(LoggingError::UnknownHandler {
                    logger: key.clone(),
                    handler: unknown.clone(),
                });
            }
            if key == ROOT_LOGGER {
                root = Some(logger);
            } else {
                loggers.push(logger);
            }
        }

        Ok(Some(Self {
            root: root.ok_or(LoggingError::MissingRootLogger)?,
            loggers,
            handlers,
            formatters,
        }))
    }

    /// Root logger at `level` writing to stderr; used before any chain is loaded.
    pub fn bootstrap(level: LevelFilter) -> Self {
        let handler = "stderr".to_string();
        let formatter = "bootstrap".to_string();
        Self {
            root: LoggerSpec {
                key: ROOT_LOGGER.to_string(),
                qualname: String::new(),
                level: Some(level),
                handlers: vec![handler.clone()],
                propagate: true,
            },
            loggers: Vec::new(),
            handlers: BTreeMap::from([(
                handler.clone(),
                HandlerSpec {
                    key: handler,
                    target: HandlerTarget::Stderr,
                    level: LevelFilter::TRACE,
                    formatter: Some(formatter.clone()),
                },
            )]),
            formatters: BTreeMap::from([(
                formatter.clone(),
                FormatterSpec {
                    key: formatter,
                    format: BOOTSTRAP_LOG_FORMAT.to_string(),
                    datefmt: None,
                },
            )]),
        }
    }
}

/// Split a `keys = a, b` list.
fn keys_of(section: Option<&BTreeMap<String, String>>) -> Vec<String> {
    section
        .and_then(|s| s.get("keys"))
        .map(|keys| split_list(keys))
        .unwrap_or_default()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a level name. `NOTSET` maps to `None`.
pub fn parse_level(raw: &str) -> Result<Option<LevelFilter>, LoggingError> {
    let level = match raw.trim().to_ascii_uppercase().as_str() {
        "NOTSET" => return Ok(None),
        "TRACE" => LevelFilter::TRACE,
        "DEBUG" => LevelFilter::DEBUG,
        "INFO" => LevelFilter::INFO,
        "WARN" | "WARNING" => LevelFilter::WARN,
        // tracing has no level above ERROR.
        "ERROR" | "CRITICAL" | "FATAL" => LevelFilter::ERROR,
        "OFF" => LevelFilter::OFF,
        _ => return Err(LoggingError::InvalidLevel(raw.to_string())),
    };
    Ok(Some(level))
}

fn parse_logger(key: &str, section: &BTreeMap<String, String>) -> Result<LoggerSpec, LoggingError> {
    let is_root = key == ROOT_LOGGER;
    let level = match section.get("level") {
        Some(raw) => match parse_level(raw)? {
            None if is_root => Some(LevelFilter::TRACE),
            level => level,
        },
        None if is_root => Some(LevelFilter::WARN),
        None => None,
    };
    let qualname = if is_root {
        String::new()
    } else {
        section
            .get("qualname")
            .map(|q| q.trim().replace("::", "."))
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| key.to_string())
    };
    let propagate = section
        .get("propagate")
        .map(|p| p.trim() != "0")
        .unwrap_or(true);

    Ok(LoggerSpec {
        key: key.to_string(),
        qualname,
        level,
        handlers: section.get("handlers").map(|h| split_list(h)).unwrap_or_default(),
        propagate,
    })
}

fn parse_handler(
    key: &str,
    section: &BTreeMap<String, String>,
) -> Result<HandlerSpec, LoggingError> {
    let class = section.get("class").map(String::as_str).unwrap_or("StreamHandler").trim();
    // `logging.StreamHandler`, `handlers.FileHandler` and bare names all match.
    let short = class.rsplit('.').next().unwrap_or(class);
    let args = section.get("args").map(String::as_str).unwrap_or("()");

    let target = match short {
        "StreamHandler" => {
            if args.contains("stdout") {
                HandlerTarget::Stdout
            } else {
                HandlerTarget::Stderr
            }
        }
        "FileHandler" => {
            let literals = string_literals(args);
            let path = section
                .get("filename")
                .cloned()
                .or_else(|| literals.first().cloned())
                .filter(|p| !p.is_empty())
                .ok_or_else(|| LoggingError::InvalidHandlerArgs {
                    handler: key.to_string(),
                    args: args.to_string(),
                })?;
            let mode = section
                .get("mode")
                .cloned()
                .or_else(|| literals.get(1).cloned())
                .unwrap_or_else(|| "a".to_string());
            HandlerTarget::File {
                path: PathBuf::from(path),
                append: !mode.starts_with('w'),
            }
        }
        "NullHandler" => HandlerTarget::Null,
        _ => {
            return Err(LoggingError::UnsupportedHandlerClass {
                handler: key.to_string(),
                class: class.to_string(),
            });
        }
    };

    let level = match section.get("level") {
        Some(raw) => parse_level(raw)?.unwrap_or(LevelFilter::TRACE),
        None => LevelFilter::TRACE,
    };

    Ok(HandlerSpec {
        key: key.to_string(),
        target,
        level,
        formatter: section
            .get("formatter")
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty()),
    })
}

/// Quoted string literals of a Python argument tuple, in order.
fn string_literals(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut chars = args.chars();
    while let Some(c) = chars.by_ref().find(|c| *c == '\'' || *c == '"') {
        let literal: String = chars.by_ref().take_while(|next| *next != c).collect();
        out.push(literal);
    }
    out
}
