//! Output formatters for CLI commands.
//!
//! Provides two output formats: INI-style text and JSON.

use anyhow::Result;
use ckan_config::MergedConfig;
use serde::Serialize;
use std::path::Path;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Parse from string.
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => anyhow::bail!("Invalid output format: {}. Valid options: text, json", s),
        }
    }
}

/// Formatter trait for different output types.
pub trait Formatter {
    /// Format the merged configuration.
    fn format_config(&self, config: &MergedConfig) -> Result<String>;

    /// Format the files of a chain, base-most first.
    fn format_chain(&self, files: &[&Path]) -> Result<String>;
}

/// One file of a chain in JSON output.
#[derive(Debug, Serialize)]
struct ChainEntry<'a> {
    position: usize,
    path: std::borrow::Cow<'a, str>,
    root: bool,
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_config(&self, config: &MergedConfig) -> Result<String> {
        Ok(serde_json::to_string_pretty(config)?)
    }

    fn format_chain(&self, files: &[&Path]) -> Result<String> {
        let entries: Vec<ChainEntry<'_>> = files
            .iter()
            .enumerate()
            .map(|(position, path)| ChainEntry {
                position,
                path: path.to_string_lossy(),
                root: position + 1 == files.len(),
            })
            .collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }
}

/// INI-style text formatter; multi-line values use indented continuation lines.
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_config(&self, config: &MergedConfig) -> Result<String> {
        let mut output = String::new();
        for (key, value) in config.iter() {
            let mut lines = value.lines();
            output.push_str(&format!("{key} = {}\n", lines.next().unwrap_or_default()));
            for line in lines {
                output.push_str(&format!("    {line}\n"));
            }
        }
        Ok(output)
    }

    fn format_chain(&self, files: &[&Path]) -> Result<String> {
        Ok(files
            .iter()
            .map(|path| format!("{}\n", path.display()))
            .collect())
    }
}

/// Get a formatter for the specified output format.
pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("TEXT").unwrap(), OutputFormat::Text);
        assert!(OutputFormat::from_str("yaml").is_err());
    }

    #[test]
    fn test_text_chain_lists_one_path_per_line() {
        let files = [Path::new("/etc/ckan/base.ini"), Path::new("/etc/ckan/site.ini")];
        assert_eq!(
            TextFormatter.format_chain(&files).unwrap(),
            "/etc/ckan/base.ini\n/etc/ckan/site.ini\n"
        );
    }

    #[test]
    fn test_json_chain_marks_root() {
        let files = [Path::new("/etc/ckan/base.ini"), Path::new("/etc/ckan/site.ini")];
        let json: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format_chain(&files).unwrap()).unwrap();
        assert_eq!(json[0]["root"], false);
        assert_eq!(json[1]["root"], true);
        assert_eq!(json[1]["path"], "/etc/ckan/site.ini");
    }
}
