//! Path helpers for configuration file locations.
//!
//! Responsibilities:
//! - Turn caller-supplied and directive-supplied paths into absolute,
//!   lexically normalised paths (the identity used for `__file__` and `here`).
//! - Resolve `use` references relative to the referencing file's directory.
//!
//! Does NOT handle:
//! - File I/O beyond `current_dir`.
//! - Symlink resolution (chain identity adds `canonicalize` separately).

use std::io;
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the current directory and drop `.`/`..`
/// components without touching the filesystem.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize_path(path))
    } else {
        Ok(normalize_path(&std::env::current_dir()?.join(path)))
    }
}

/// Lexically normalise a path: remove `.` and fold `..` into its parent.
///
/// A `..` directly below the root stays at the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve a `use` reference against the directory of the file that holds it.
pub fn resolve_reference(referencing_dir: &Path, reference: &str) -> PathBuf {
    let reference = Path::new(reference);
    if reference.is_absolute() {
        normalize_path(reference)
    } else {
        normalize_path(&referencing_dir.join(reference))
    }
}

/// Directory of a file path; the root for paths with no parent.
pub fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"))
}
