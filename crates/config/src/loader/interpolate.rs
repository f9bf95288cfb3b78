//! Per-file `%(name)s` interpolation.
//!
//! Responsibilities:
//! - Build the main-section view of one file (defaults section overlaid by the
//!   main section) and substitute every placeholder in it.
//! - Resolve the file's logging sections in the same file scope.
//! - Bind `here` to the file's own directory and `__file__` to the root path.
//!
//! Does NOT handle:
//! - Combining the values of several files (see merge.rs).
//! - Reading files or following `use` directives (see chain.rs).
//!
//! Invariants:
//! - Placeholders are resolved against the defining file only, then (when
//!   enabled) the values inherited from more-base files, then the environment.
//! - Substitution is single-pass: text produced by a substitution is never
//!   scanned for further placeholders.
//! - A reference that loops back to itself is unresolvable within the file.
//! - The output holds no placeholder syntax except in raw logging keys.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::warn;

use super::chain::ConfigFile;
use super::env::EnvironmentView;
use super::error::{ConfigError, ConfigurationError};
use crate::constants::{
    DEFAULT_SECTION, FILE_KEY, FORMATTERS_SECTION, FORMATTER_SECTION_PREFIX, HANDLERS_SECTION,
    HANDLER_SECTION_PREFIX, HERE_KEY, LOGGERS_SECTION, LOGGER_SECTION_PREFIX, RAW_LOGGING_KEYS,
};

/// Logging sections of one file or of a whole chain, keyed by section name.
pub type LoggingSections = BTreeMap<String, BTreeMap<String, String>>;

/// The fully substituted values of one file of a chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFileMapping {
    pub path: PathBuf,
    /// Main-section view, including `here` and `__file__`.
    pub values: BTreeMap<String, String>,
    pub logging: LoggingSections,
}

/// True for the section names that make up a logging sub-configuration.
pub fn is_logging_section(name: &str) -> bool {
    matches!(name, LOGGERS_SECTION | HANDLERS_SECTION | FORMATTERS_SECTION)
        || name.starts_with(LOGGER_SECTION_PREFIX)
        || name.starts_with(HANDLER_SECTION_PREFIX)
        || name.starts_with(FORMATTER_SECTION_PREFIX)
}

/// Resolves one file's placeholders within that file's own scope.
#[derive(Debug, Clone)]
pub struct FileInterpolator<'a> {
    env: &'a EnvironmentView,
    main_section: &'a str,
    root_path: &'a Path,
    inherited: Option<&'a BTreeMap<String, String>>,
}

impl<'a> FileInterpolator<'a> {
    pub fn new(env: &'a EnvironmentView, main_section: &'a str, root_path: &'a Path) -> Self {
        Self {
            env,
            main_section,
            root_path,
            inherited: None,
        }
    }

    /// Let unresolved references fall back to values merged from base files
    /// before consulting the environment.
    pub fn with_inherited(mut self, values: &'a BTreeMap<String, String>) -> Self {
        self.inherited = Some(values);
        self
    }

    pub fn resolve(&self, file: &ConfigFile) -> Result<ResolvedFileMapping, ConfigurationError> {
        self.resolve_inner(file)
            .map_err(|e| ConfigurationError::new(file.path(), e))
    }

    fn resolve_inner(&self, file: &ConfigFile) -> Result<ResolvedFileMapping, ConfigError> {
        let here = file.dir().to_string_lossy().into_owned();
        let root = self.root_path.to_string_lossy().into_owned();

        let main_view = section_view(file, self.main_section);
        let mut values = self
            .section_resolver(self.main_section, &main_view, &here, &root, &[])
            .resolve_all(main_view.keys())?;
        values.insert(HERE_KEY.to_string(), here.clone());
        values.insert(FILE_KEY.to_string(), root.clone());

        let mut logging = LoggingSections::new();
        for section in file.document().sections() {
            if !is_logging_section(section.name()) {
                continue;
            }
            let view = section_view(file, section.name());
            let own_keys = section.entries().map(|(k, _)| k.to_string()).collect::<Vec<_>>();
            let resolved = self
                .section_resolver(section.name(), &view, &here, &root, RAW_LOGGING_KEYS)
                .resolve_all(own_keys.iter())?;
            logging.insert(section.name().to_string(), resolved);
        }

        Ok(ResolvedFileMapping {
            path: file.path().to_path_buf(),
            values,
            logging,
        })
    }

    fn section_resolver<'s>(
        &'s self,
        section: &'s str,
        raw: &'s BTreeMap<String, String>,
        here: &'s str,
        root: &'s str,
        raw_keys: &'s [&'s str],
    ) -> SectionResolver<'s> {
        SectionResolver {
            section,
            raw,
            here,
            root,
            raw_keys,
            env: self.env,
            inherited: self.inherited,
            resolved: HashMap::new(),
            stack: Vec::new(),
        }
    }
}

/// Defaults section overlaid by `section`, without the reserved keys.
fn section_view(file: &ConfigFile, section: &str) -> BTreeMap<String, String> {
    let doc = file.document();
    let mut view = BTreeMap::new();
    let names: &[&str] = if section == DEFAULT_SECTION {
        &[DEFAULT_SECTION]
    } else {
        &[DEFAULT_SECTION, section]
    };
    for name in names {
        if let Some(s) = doc.section(name) {
            for (k, v) in s.entries() {
                view.insert(k.to_string(), v.to_string());
            }
        }
    }
    for reserved in [HERE_KEY, FILE_KEY] {
        if view.remove(reserved).is_some() {
            warn!(
                file = %file.path().display(),
                key = reserved,
                "Ignoring reserved key defined in config file"
            );
        }
    }
    view
}

struct SectionResolver<'s> {
    section: &'s str,
    raw: &'s BTreeMap<String, String>,
    here: &'s str,
    root: &'s str,
    raw_keys: &'s [&'s str],
    env: &'s EnvironmentView,
    inherited: Option<&'s BTreeMap<String, String>>,
    resolved: HashMap<String, String>,
    stack: Vec<String>,
}

impl<'s> SectionResolver<'s> {
    fn resolve_all<'k>(
        mut self,
        keys: impl Iterator<Item = &'k String>,
    ) -> Result<BTreeMap<String, String>, ConfigError> {
        let mut out = BTreeMap::new();
        for key in keys {
            if let Some(value) = self.lookup(key)? {
                out.insert(key.clone(), value);
            }
        }
        Ok(out)
    }

    /// Value of `key` within this file, or `None` if the file cannot supply it.
    fn lookup(&mut self, key: &str) -> Result<Option<String>, ConfigError> {
        match key {
            HERE_KEY => return Ok(Some(self.here.to_string())),
            FILE_KEY => return Ok(Some(self.root.to_string())),
            _ => {}
        }
        if let Some(value) = self.resolved.get(key) {
            return Ok(Some(value.clone()));
        }
        let raw = self.raw;
        let Some(template) = raw.get(key) else {
            return Ok(None);
        };
        if self.raw_keys.iter().any(|k| *k == key) {
            return Ok(Some(template.clone()));
        }
        if self.stack.iter().any(|k| k == key) {
            return Ok(None);
        }

        self.stack.push(key.to_string());
        let expanded = self.expand(key, template);
        self.stack.pop();
        let expanded = expanded?;

        self.resolved.insert(key.to_string(), expanded.clone());
        Ok(Some(expanded))
    }

    fn expand(&mut self, option: &str, template: &str) -> Result<String, ConfigError> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            if let Some(tail) = after.strip_prefix('%') {
                out.push('%');
                rest = tail;
            } else if let Some(tail) = after.strip_prefix('(') {
                let close = tail
                    .find(')')
                    .ok_or_else(|| self.syntax(option, "unterminated `%(` placeholder"))?;
                let name = tail[..close].to_lowercase();
                let tail = tail[close + 1..]
                    .strip_prefix('s')
                    .ok_or_else(|| self.syntax(option, "placeholder must end with `)s`"))?;
                let value = self.reference(option, &name)?;
                out.push_str(&value);
                rest = tail;
            } else {
                return Err(self.syntax(option, "`%` must be followed by `%` or `(`"));
            }
        }
        out.push_str(rest);
        Ok(out)
    }

    fn reference(&mut self, option: &str, name: &str) -> Result<String, ConfigError> {
        if let Some(value) = self.lookup(name)? {
            return Ok(value);
        }
        if let Some(value) = self.inherited.and_then(|values| values.get(name)) {
            return Ok(value.clone());
        }
        if let Some(value) = self.env.get(name) {
            return Ok(value.to_string());
        }
        Err(ConfigError::InterpolationMissingOption {
            section: self.section.to_string(),
            option: option.to_string(),
            reference: name.to_string(),
        })
    }

    fn syntax(&self, option: &str, message: &str) -> ConfigError {
        ConfigError::InterpolationSyntax {
            section: self.section.to_string(),
            option: option.to_string(),
            message: message.to_string(),
        }
    }
}
