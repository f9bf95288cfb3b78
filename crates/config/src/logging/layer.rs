//! A `tracing` layer compiled from a [`LoggingSpec`].
//!
//! Routing follows the logger hierarchy: an event's target (with `::`
//! read as `.`) selects the most specific configured logger, whose level
//! (or the nearest ancestor's) gates the event. Handlers are then collected
//! from that logger up to root until a logger with `propagate = 0`, and each
//! handler applies its own level before writing.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use chrono::Local;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::subscriber::Interest;
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use super::LoggingError;
use super::format::{LogFormat, Record};
use super::spec::{HandlerTarget, LoggerSpec, LoggingSpec};
use crate::constants::DEFAULT_LOG_FORMAT;

enum HandlerWriter {
    Stderr,
    Stdout,
    File(Mutex<File>),
    Null,
}

impl HandlerWriter {
    fn open(target: &HandlerTarget) -> Result<Self, LoggingError> {
        Ok(match target {
            HandlerTarget::Stderr => Self::Stderr,
            HandlerTarget::Stdout => Self::Stdout,
            HandlerTarget::Null => Self::Null,
            HandlerTarget::File { path, append } => {
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .append(*append)
                    .truncate(!*append)
                    .open(path)
                    .map_err(|source| LoggingError::OpenLogFile {
                        path: path.clone(),
                        source,
                    })?;
                Self::File(Mutex::new(file))
            }
        })
    }

    // Write failures are dropped: there is nowhere left to report them.
    fn write_line(&self, line: &str) {
        match self {
            Self::Stderr => {
                let _ = writeln!(std::io::stderr().lock(), "{line}");
            }
            Self::Stdout => {
                let _ = writeln!(std::io::stdout().lock(), "{line}");
            }
            Self::File(file) => {
                let mut file = file.lock().unwrap_or_else(PoisonError::into_inner);
                let _ = writeln!(file, "{line}");
                let _ = file.flush();
            }
            Self::Null => {}
        }
    }
}

struct CompiledHandler {
    writer: HandlerWriter,
    level: LevelFilter,
    format: LogFormat,
}

struct CompiledLogger {
    qualname: String,
    level: Option<LevelFilter>,
    handlers: Vec<usize>,
    propagate: bool,
}

impl CompiledLogger {
    fn matches(&self, name: &str) -> bool {
        name == self.qualname
            || name
                .strip_prefix(self.qualname.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

/// Layer that writes events the way a `fileConfig` logging setup would.
pub struct ChainLayer {
    root: CompiledLogger,
    /// Most specific (longest qualname) first.
    loggers: Vec<CompiledLogger>,
    handlers: Vec<CompiledHandler>,
}

impl fmt::Debug for ChainLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainLayer")
            .field("loggers", &self.loggers.len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl ChainLayer {
    /// Open every handler of `spec`. Fails without side effects beyond
    /// creating log files.
    pub fn compile(spec: &LoggingSpec) -> Result<Self, LoggingError> {
        let mut names = Vec::new();
        let mut handlers = Vec::new();
        for (name, handler) in &spec.handlers {
            let formatter = handler
                .formatter
                .as_ref()
                .and_then(|f| spec.formatters.get(f));
            let format = match formatter {
                Some(formatter) => {
                    LogFormat::parse(&formatter.format, formatter.datefmt.as_deref())
                }
                None => LogFormat::parse(DEFAULT_LOG_FORMAT, None),
            }
            .map_err(|message| LoggingError::InvalidFormat {
                formatter: handler.formatter.clone().unwrap_or_default(),
                message,
            })?;
            handlers.push(CompiledHandler {
                writer: HandlerWriter::open(&handler.target)?,
                level: handler.level,
                format,
            });
            names.push(name.as_str());
        }

        let compile_logger = |logger: &LoggerSpec| CompiledLogger {
            qualname: logger.qualname.clone(),
            level: logger.level,
            handlers: logger
                .handlers
                .iter()
                .filter_map(|h| names.iter().position(|n| n == h))
                .collect(),
            propagate: logger.propagate,
        };

        let mut loggers: Vec<_> = spec.loggers.iter().map(compile_logger).collect();
        loggers.sort_by(|a, b| b.qualname.len().cmp(&a.qualname.len()));

        Ok(Self {
            root: compile_logger(&spec.root),
            loggers,
            handlers,
        })
    }

    /// A layer that drops everything.
    pub fn silent() -> Self {
        Self {
            root: CompiledLogger {
                qualname: String::new(),
                level: Some(LevelFilter::OFF),
                handlers: Vec::new(),
                propagate: false,
            },
            loggers: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Loggers that apply to `name`, most specific first, root last.
    fn ancestry<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CompiledLogger> + 'a {
        self.loggers
            .iter()
            .filter(move |logger| logger.matches(name))
            .chain(std::iter::once(&self.root))
    }

    fn effective_level(&self, name: &str) -> LevelFilter {
        self.ancestry(name)
            .find_map(|logger| logger.level)
            .unwrap_or(LevelFilter::WARN)
    }

    fn is_enabled(&self, metadata: &Metadata<'_>) -> bool {
        let name = dotted(metadata.target());
        *metadata.level() <= self.effective_level(&name)
    }
}

fn dotted(target: &str) -> String {
    target.replace("::", ".")
}

impl<S: Subscriber> Layer<S> for ChainLayer {
    // Levels change on every reload; never let callsites cache a verdict.
    fn register_callsite(&self, _metadata: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }

    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        self.is_enabled(metadata)
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let name = dotted(metadata.target());
        let level = *metadata.level();
        if level > self.effective_level(&name) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let message = visitor.finish();
        let record = Record {
            level,
            target: metadata.target(),
            message: &message,
            module: metadata.module_path(),
            file: metadata.file(),
            line: metadata.line(),
            time: Local::now(),
        };

        for logger in self.ancestry(&name) {
            for &index in &logger.handlers {
                let handler = &self.handlers[index];
                if level <= handler.level {
                    handler.writer.write_line(&handler.format.render(&record));
                }
            }
            if !logger.propagate {
                break;
            }
        }
    }
}

/// Collects the `message` field plus any other fields as `key=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            return self.message;
        }
        let fields = self.fields.join(" ");
        if self.message.is_empty() {
            fields
        } else {
            format!("{} {fields}", self.message)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={value}", field.name()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{}={value:?}", field.name()));
        }
    }
}
