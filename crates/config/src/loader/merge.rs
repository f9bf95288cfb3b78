//! Override-merge of per-file mappings across a chain.
//!
//! Later mappings (closer to the root file) overwrite the keys they define;
//! keys they leave out are inherited. Explicit empty values are real
//! overrides: there is no way to unset an inherited key. Logging sections
//! fold with the same rule, one (section, key) pair at a time.

use std::collections::BTreeMap;
use std::path::Path;

use super::interpolate::{LoggingSections, ResolvedFileMapping};
use crate::constants::FILE_KEY;
use crate::types::MergedConfig;

/// Result of folding a whole chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedChain {
    pub config: MergedConfig,
    /// Empty when no file of the chain carries logging sections.
    pub logging: LoggingSections,
}

/// Left-to-right fold over resolved files, base-most first.
#[derive(Debug, Clone, Default)]
pub struct ChainMerger {
    values: BTreeMap<String, String>,
    logging: LoggingSections,
}

impl ChainMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay one resolved file on top of everything pushed so far.
    pub fn push(&mut self, resolved: ResolvedFileMapping) {
        self.values.extend(resolved.values);
        for (section, entries) in resolved.logging {
            self.logging.entry(section).or_default().extend(entries);
        }
    }

    /// Values accumulated so far.
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Finish the fold; `__file__` always names `root_path`.
    pub fn finish(mut self, root_path: &Path) -> MergedChain {
        self.values.insert(
            FILE_KEY.to_string(),
            root_path.to_string_lossy().into_owned(),
        );
        MergedChain {
            config: MergedConfig::from_values(self.values),
            logging: self.logging,
        }
    }
}

/// Fold an ordered list of resolved files into a single configuration.
pub fn merge(
    resolved_files: impl IntoIterator<Item = ResolvedFileMapping>,
    root_path: &Path,
) -> MergedChain {
    let mut merger = ChainMerger::new();
    for resolved in resolved_files {
        merger.push(resolved);
    }
    merger.finish(root_path)
}
