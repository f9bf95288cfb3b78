//! Tests for the chained configuration loader.
//!
//! Responsibilities:
//! - Exercise `ConfigLoader` end to end against fixture trees on disk.
//! - Cover chain resolution, interpolation scope, environment fallback, and
//!   logging re-application through a recording backend.
//!
//! Does NOT handle:
//! - Parser and per-module unit tests (kept next to each module).
//! - The global `tracing` backend (see tests/logging_integration_test.rs).
//!
//! Invariants:
//! - Tests touching the process environment use `serial_test` and `env_lock()`.
//! - Temporary directories are cleaned up automatically via `tempfile`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;

use crate::loader::{ConfigLoader, EnvironmentView};


/// Returns the global test lock for environment variable isolation.
pub fn env_lock() -> &'static Mutex<()> {
    crate::test_util::global_test_lock()
}

/// A temporary directory holding config files.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `text` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, text).unwrap();
        path
    }
}

/// A loader isolated from the process environment and the global logger.
pub fn isolated(path: &Path) -> ConfigLoader {
    ConfigLoader::new(path)
        .with_environment(EnvironmentView::default())
        .without_logging()
}

/// The `test-core` / `ckanext-extension` pair of templates.
pub fn core_and_extension(fixture: &Fixture) -> (PathBuf, PathBuf) {
    let core = fixture.write(
        "templates/test-core.ini",
        "[DEFAULT]\n\
         debug = false\n\
         key1 = %(here)s/core\n\
         \n\
         [app:main]\n\
         use = egg:ckan\n\
         key2 = %(here)s/core\n\
         key4 = core\n",
    );
    let extension = fixture.write(
        "templates/ckanext-extension/test-extension.ini",
        "[DEFAULT]\n\
         debug = true\n\
         \n\
         [app:main]\n\
         use = config:../test-core.ini\n\
         key1 = %(here)s/extension\n\
         key3 = %(here)s/extension\n\
         key4 = extension\n",
    );
    (core, extension)
}
