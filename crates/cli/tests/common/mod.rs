//! Shared test utilities for ckan CLI integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Write fixture configuration files.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper will be hermetic by default.
//! - `CKAN_INI` is cleared unless a test sets it.

use assert_cmd::Command;
use std::path::{Path, PathBuf};

/// Returns a hermetic `ckan` command for integration testing.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - `CKAN_INI` from the host does not leak into the test.
pub fn ckan_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("ckan");

    // Hermeticity: prevent loading local .env
    cmd.env("DOTENV_DISABLED", "1");

    // Clear potential host leakage
    cmd.env_remove("CKAN_INI");

    cmd
}

/// Write `text` to `relative` under `dir`, creating parent directories.
pub fn write_config(dir: &Path, relative: &str, text: &str) -> PathBuf {
    let path = dir.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, text).unwrap();
    path
}

/// A two-file chain: `site/site.ini` over `base.ini`. Returns the root path.
#[allow(dead_code)]
pub fn write_chain(dir: &Path) -> PathBuf {
    write_config(
        dir,
        "base.ini",
        "[DEFAULT]\ndebug = false\n\n[app:main]\nckan.site_url = http://localhost:5000\nckan.storage_path = %(here)s/storage\n",
    );
    write_config(
        dir,
        "site/site.ini",
        "[DEFAULT]\ndebug = true\n\n[app:main]\nuse = config:../base.ini\nckan.site_url = https://data.example.org\nckan.plugins = stats\n    text_view\n",
    )
}
