//! `%(field)s` record formatting for log handlers.
//!
//! Supports the record attributes that map onto `tracing` metadata, with
//! printf-style flags, width and precision (`%(levelname)-5.5s`).

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use tracing::Level;

/// Timestamp layout used when a formatter has no `datefmt`.
const DEFAULT_DATEFMT: &str = "%Y-%m-%d %H:%M:%S,%3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    AscTime,
    LevelName,
    LevelNo,
    Name,
    Message,
    Module,
    FileName,
    LineNo,
    Process,
    Thread,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "asctime" => Self::AscTime,
            "levelname" => Self::LevelName,
            "levelno" => Self::LevelNo,
            "name" => Self::Name,
            "message" => Self::Message,
            "module" => Self::Module,
            "filename" | "pathname" => Self::FileName,
            "lineno" => Self::LineNo,
            "process" => Self::Process,
            "thread" | "threadname" => Self::Thread,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Spec {
    left: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Field(Field, Spec),
}

/// One event, as seen by a formatter.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub level: Level,
    pub target: &'a str,
    pub message: &'a str,
    pub module: Option<&'a str>,
    pub file: Option<&'a str>,
    pub line: Option<u32>,
    pub time: DateTime<Local>,
}

/// A compiled format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFormat {
    pieces: Vec<Piece>,
    datefmt: String,
}

impl LogFormat {
    /// Compile `format`, validating `datefmt` as a strftime pattern.
    pub fn parse(format: &str, datefmt: Option<&str>) -> Result<Self, String> {
        let datefmt = datefmt.unwrap_or(DEFAULT_DATEFMT).to_string();
        if StrftimeItems::new(&datefmt).any(|item| matches!(item, Item::Error)) {
            return Err(format!("invalid datefmt {datefmt:?}"));
        }

        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut rest = format;
        while let Some(pos) = rest.find('%') {
            literal.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            if let Some(tail) = after.strip_prefix('%') {
                literal.push('%');
                rest = tail;
                continue;
            }
            let Some(tail) = after.strip_prefix('(') else {
                return Err(format!("stray `%` in {format:?}"));
            };
            let close = tail
                .find(')')
                .ok_or_else(|| format!("unterminated `%(` in {format:?}"))?;
            let name = &tail[..close];
            let field =
                Field::from_name(name).ok_or_else(|| format!("unknown record field {name:?}"))?;
            let (spec, tail) = parse_spec(&tail[close + 1..])
                .ok_or_else(|| format!("bad conversion for field {name:?}"))?;

            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(Piece::Field(field, spec));
            rest = tail;
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self { pieces, datefmt })
    }

    pub fn render(&self, record: &Record<'_>) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Field(field, spec) => {
                    let value = self.field_value(*field, record);
                    apply_spec(&mut out, &value, *spec);
                }
            }
        }
        out
    }

    fn field_value(&self, field: Field, record: &Record<'_>) -> String {
        match field {
            Field::AscTime => {
                let mut stamp = String::new();
                // datefmt was validated in `parse`.
                let _ = write!(stamp, "{}", record.time.format(&self.datefmt));
                stamp
            }
            Field::LevelName => level_name(record.level).to_string(),
            Field::LevelNo => level_number(record.level).to_string(),
            Field::Name => record.target.to_string(),
            Field::Message => record.message.to_string(),
            Field::Module => record
                .module
                .map(|m| m.rsplit("::").next().unwrap_or(m).to_string())
                .unwrap_or_default(),
            Field::FileName => record.file.unwrap_or_default().to_string(),
            Field::LineNo => record.line.map(|l| l.to_string()).unwrap_or_default(),
            Field::Process => std::process::id().to_string(),
            Field::Thread => std::thread::current()
                .name()
                .unwrap_or("unnamed")
                .to_string(),
        }
    }
}

/// Parse `[-][width][.precision](s|d|r)` after a `%(name)`.
fn parse_spec(text: &str) -> Option<(Spec, &str)> {
    let mut spec = Spec::default();
    let mut rest = text;
    if let Some(tail) = rest.strip_prefix('-') {
        spec.left = true;
        rest = tail;
    }
    let (width, tail) = take_number(rest);
    spec.width = width;
    rest = tail;
    if let Some(tail) = rest.strip_prefix('.') {
        let (precision, tail) = take_number(tail);
        spec.precision = Some(precision.unwrap_or(0));
        rest = tail;
    }
    let mut chars = rest.chars();
    match chars.next() {
        Some('s' | 'd' | 'r') => Some((spec, chars.as_str())),
        _ => None,
    }
}

fn take_number(text: &str) -> (Option<usize>, &str) {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    (text[..end].parse().ok(), &text[end..])
}

fn apply_spec(out: &mut String, value: &str, spec: Spec) {
    let value: String = match spec.precision {
        Some(precision) => value.chars().take(precision).collect(),
        None => value.to_string(),
    };
    let width = spec.width.unwrap_or(0);
    if spec.left {
        let _ = write!(out, "{value:<width$}");
    } else {
        let _ = write!(out, "{value:>width$}");
    }
}

/// Level names as Python's logging prints them.
pub fn level_name(level: Level) -> &'static str {
    match level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

fn level_number(level: Level) -> u8 {
    match level {
        Level::ERROR => 40,
        Level::WARN => 30,
        Level::INFO => 20,
        Level::DEBUG => 10,
        Level::TRACE => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(level: Level, message: &str) -> Record<'_> {
        Record {
            level,
            target: "ckan_config::loader::chain",
            message,
            module: Some("ckan_config::loader::chain"),
            file: Some("crates/config/src/loader/chain.rs"),
            line: Some(42),
            time: Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap(),
        }
    }

    #[test]
    fn test_width_and_precision() {
        let format = LogFormat::parse("%(levelname)-5.5s|%(levelno)3d|%(message)s", None).unwrap();
        assert_eq!(format.render(&record(Level::WARN, "hi")), "WARNI| 30|hi");
        assert_eq!(format.render(&record(Level::INFO, "hi")), "INFO | 20|hi");
    }

    #[test]
    fn test_name_module_and_line() {
        let format = LogFormat::parse("[%(name)s] %(module)s:%(lineno)d %%", None).unwrap();
        assert_eq!(
            format.render(&record(Level::ERROR, "x")),
            "[ckan_config::loader::chain] chain:42 %"
        );
    }

    #[test]
    fn test_asctime_default_and_custom_datefmt() {
        let format = LogFormat::parse("%(asctime)s", None).unwrap();
        assert_eq!(
            format.render(&record(Level::INFO, "x")),
            "2024-03-01 12:30:05,000"
        );

        let format = LogFormat::parse("%(asctime)s", Some("%H:%M")).unwrap();
        assert_eq!(format.render(&record(Level::INFO, "x")), "12:30");
    }

    #[test]
    fn test_invalid_formats() {
        assert!(LogFormat::parse("%(nope)s", None).is_err());
        assert!(LogFormat::parse("%(message)", None).is_err());
        assert!(LogFormat::parse("100%", None).is_err());
        assert!(LogFormat::parse("%(message)s", Some("%Q%")).is_err());
    }
}
