//! Configuration types returned by the loader.

use std::collections::BTreeMap;
use std::ops::Index;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::constants::{FILE_KEY, HERE_KEY};

/// Errors from typed lookups on a [`MergedConfig`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Missing config key: {0}")]
    MissingKey(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// The flat key/value result of folding an entire chain.
///
/// Keys iterate in sorted order. A key that no file of the chain defines is
/// absent; it is never synthesised as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MergedConfig {
    values: BTreeMap<String, String>,
}

impl MergedConfig {
    pub(crate) fn from_values(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Look up a key that must be present.
    pub fn require(&self, key: &str) -> Result<&str, LookupError> {
        self.get(key)
            .ok_or_else(|| LookupError::MissingKey(key.to_string()))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Path of the originally requested root file.
    pub fn file(&self) -> Option<PathBuf> {
        self.get(FILE_KEY).map(PathBuf::from)
    }

    /// Directory of the nearest file of the chain.
    pub fn here(&self) -> Option<PathBuf> {
        self.get(HERE_KEY).map(PathBuf::from)
    }

    /// Interpret a value as a boolean the way CKAN's `asbool` does.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, LookupError> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "y" | "t" | "1" => Ok(Some(true)),
            "false" | "no" | "off" | "n" | "f" | "0" => Ok(Some(false)),
            _ => Err(LookupError::InvalidValue {
                key: key.to_string(),
                message: format!("{raw:?} is not a boolean"),
            }),
        }
    }

    /// Like [`MergedConfig::get_bool`], with a default for absent keys.
    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool, LookupError> {
        Ok(self.get_bool(key)?.unwrap_or(default))
    }

    /// Split a value on whitespace and commas (CKAN's `aslist`).
    ///
    /// An absent key yields an empty list.
    pub fn get_list(&self, key: &str) -> Vec<&str> {
        self.get(key)
            .map(|raw| {
                raw.split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|item| !item.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.values
    }
}

impl Index<&str> for MergedConfig {
    type Output = str;

    /// Panics when the key is absent, like `HashMap` indexing.
    fn index(&self, key: &str) -> &str {
        match self.get(key) {
            Some(value) => value,
            None => panic!("missing config key: {key:?}"),
        }
    }
}

impl From<MergedConfig> for BTreeMap<String, String> {
    fn from(config: MergedConfig) -> Self {
        config.values
    }
}
