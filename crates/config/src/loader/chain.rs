//! Chain discovery for `use = config:...` directives.
//!
//! Responsibilities:
//! - Read and parse each file of a chain exactly once.
//! - Follow `use` directives from the root file towards the base-most file.
//! - Reject malformed directives, cycles, and references to missing files.
//!
//! Does NOT handle:
//! - Interpolation of values (see interpolate.rs).
//! - Merging the files of a chain (see merge.rs).
//!
//! Invariants:
//! - The returned chain is ordered base-most first; the root file is last.
//! - No file appears twice; identity is both the normalised path and the
//!   canonical (symlink-resolved) path.
//! - References are resolved relative to the referencing file's directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{ConfigError, ConfigurationError};
use crate::constants::{CONFIG_SCHEME, DEFAULT_SECTION, USE_KEY};
use crate::ini::IniDocument;
use crate::paths::{absolute_path, parent_dir, resolve_reference};

/// One parsed file of a chain.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    dir: PathBuf,
    document: IniDocument,
    use_directive: Option<String>,
}

impl ConfigFile {
    /// Read and parse the file at `path` (already absolute and normalised).
    pub fn read(path: &Path, main_section: &str) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::new(path, ConfigError::Read(e)))?;
        Self::parse(path, &text, main_section)
    }

    /// Parse configuration text as if it had been read from `path`.
    pub fn parse(path: &Path, text: &str, main_section: &str) -> Result<Self, ConfigurationError> {
        let document =
            IniDocument::parse(text).map_err(|e| ConfigurationError::new(path, e.into()))?;
        let use_directive = [main_section, DEFAULT_SECTION]
            .iter()
            .find_map(|name| document.section(name)?.get(USE_KEY))
            .map(str::to_string);

        Ok(Self {
            path: path.to_path_buf(),
            dir: parent_dir(path),
            document,
            use_directive,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the file; bound to `here` during interpolation.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn document(&self) -> &IniDocument {
        &self.document
    }

    /// Raw `use` value, if the file has one.
    pub fn use_directive(&self) -> Option<&str> {
        self.use_directive.as_deref()
    }
}

/// Files connected by `use` directives, base-most first, root last.
#[derive(Debug, Clone)]
pub struct Chain {
    files: Vec<ConfigFile>,
}

impl Chain {
    pub fn files(&self) -> &[ConfigFile] {
        &self.files
    }

    /// The originally requested file.
    pub fn root(&self) -> &ConfigFile {
        // A chain is only built by `ChainResolver`, which always pushes the root.
        &self.files[self.files.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths of the chain, base-most first.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(ConfigFile::path)
    }
}

/// A parsed `use` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `config:<reference>`: chain to another configuration file.
    Config(String),
    /// Any other scheme, e.g. `egg:ckan`; ends the chain.
    Other { scheme: String, reference: String },
}

/// Parse `scheme:reference`. Exactly one colon, both sides non-empty.
pub fn parse_directive(value: &str) -> Result<Directive, ConfigError> {
    let malformed = || ConfigError::MalformedDirective {
        value: value.to_string(),
    };
    let mut parts = value.trim().split(':');
    let (Some(scheme), Some(reference), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };
    let (scheme, reference) = (scheme.trim(), reference.trim());
    if scheme.is_empty() || reference.is_empty() {
        return Err(malformed());
    }

    if scheme == CONFIG_SCHEME {
        Ok(Directive::Config(reference.to_string()))
    } else {
        Ok(Directive::Other {
            scheme: scheme.to_string(),
            reference: reference.to_string(),
        })
    }
}

/// Walks `use` directives starting from a root file.
#[derive(Debug, Clone)]
pub struct ChainResolver<'a> {
    main_section: &'a str,
}

impl<'a> ChainResolver<'a> {
    pub fn new(main_section: &'a str) -> Self {
        Self { main_section }
    }

    pub fn resolve(&self, root: &Path) -> Result<Chain, ConfigurationError> {
        let root = absolute_path(root)
            .map_err(|e| ConfigurationError::new(root, ConfigError::Read(e)))?;
        if !root.exists() {
            return Err(ConfigurationError::new(
                &root,
                ConfigError::MissingChainFile {
                    path: root.clone(),
                    referenced_by: None,
                },
            ));
        }

        let mut visited: HashSet<PathBuf> = HashSet::new();
        remember(&mut visited, &root);

        let mut files = Vec::new();
        let mut current = ConfigFile::read(&root, self.main_section)?;
        loop {
            let Some(next_path) = self.next_in_chain(&current)? else {
                files.push(current);
                break;
            };

            if is_visited(&visited, &next_path) {
                return Err(ConfigurationError::new(
                    current.path(),
                    ConfigError::CyclicChain { path: next_path },
                ));
            }
            if !next_path.exists() {
                return Err(ConfigurationError::new(
                    current.path(),
                    ConfigError::MissingChainFile {
                        path: next_path,
                        referenced_by: Some(current.path().to_path_buf()),
                    },
                ));
            }
            remember(&mut visited, &next_path);

            debug!(
                from = %current.path().display(),
                to = %next_path.display(),
                "Following config chain"
            );
            let next = ConfigFile::read(&next_path, self.main_section)?;
            files.push(std::mem::replace(&mut current, next));
        }

        files.reverse();
        Ok(Chain { files })
    }

    fn next_in_chain(&self, file: &ConfigFile) -> Result<Option<PathBuf>, ConfigurationError> {
        let Some(value) = file.use_directive() else {
            return Ok(None);
        };
        match parse_directive(value).map_err(|e| ConfigurationError::new(file.path(), e))? {
            Directive::Config(reference) => Ok(Some(resolve_reference(file.dir(), &reference))),
            Directive::Other { scheme, reference } => {
                debug!(
                    file = %file.path().display(),
                    scheme = %scheme,
                    reference = %reference,
                    "Non-config `use` directive ends the chain"
                );
                Ok(None)
            }
        }
    }
}

fn remember(visited: &mut HashSet<PathBuf>, path: &Path) {
    visited.insert(path.to_path_buf());
    if let Ok(canonical) = std::fs::canonicalize(path) {
        visited.insert(canonical);
    }
}

fn is_visited(visited: &HashSet<PathBuf>, path: &Path) -> bool {
    if visited.contains(path) {
        return true;
    }
    std::fs::canonicalize(path)
        .map(|canonical| visited.contains(&canonical))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directive_shapes() {
        assert_eq!(
            parse_directive("config:base.ini").unwrap(),
            Directive::Config("base.ini".to_string())
        );
        assert_eq!(
            parse_directive(" config : ../base.ini ").unwrap(),
            Directive::Config("../base.ini".to_string())
        );
        assert_eq!(
            parse_directive("egg:ckan").unwrap(),
            Directive::Other {
                scheme: "egg".to_string(),
                reference: "ckan".to_string()
            }
        );
    }

    #[test]
    fn test_parse_directive_rejects_malformed_values() {
        for value in ["base.ini", ":base.ini", "config:", "config:a:b", "", ":"] {
            let err = parse_directive(value).unwrap_err();
            assert!(
                matches!(err, ConfigError::MalformedDirective { .. }),
                "{value:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_use_read_from_main_section_then_defaults() {
        let path = Path::new("/srv/ckan/site.ini");
        let file =
            ConfigFile::parse(path, "[app:main]\nuse = config:base.ini\n", "app:main").unwrap();
        assert_eq!(file.use_directive(), Some("config:base.ini"));
        assert_eq!(file.dir(), Path::new("/srv/ckan"));

        let file = ConfigFile::parse(path, "[DEFAULT]\nuse = config:d.ini\n", "app:main").unwrap();
        assert_eq!(file.use_directive(), Some("config:d.ini"));

        let file = ConfigFile::parse(path, "[other]\nuse = config:x.ini\n", "app:main").unwrap();
        assert_eq!(file.use_directive(), None);
    }

    #[test]
    fn test_parse_error_names_file() {
        let path = Path::new("/srv/ckan/broken.ini");
        let err = ConfigFile::parse(path, "orphan = 1\n", "app:main").unwrap_err();
        assert_eq!(err.path(), path);
        assert!(matches!(err.kind(), ConfigError::Parse { line: 1, .. }));
    }
}
