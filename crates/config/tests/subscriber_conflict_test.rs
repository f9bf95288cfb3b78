//! The global backend cannot take over when another subscriber owns the
//! process. Kept in its own test binary because it installs a global
//! subscriber first.

use std::path::PathBuf;

use ckan_config::{ConfigError, ConfigLoader, EnvironmentView, LoggingError};
use tempfile::TempDir;

#[test]
fn test_foreign_global_subscriber_is_reported() {
    tracing_subscriber::fmt().with_test_writer().try_init().unwrap();

    let temp = TempDir::new().unwrap();
    let path: PathBuf = temp.path().join("site.ini");
    std::fs::write(
        &path,
        "[app:main]\n[loggers]\nkeys = root\n[logger_root]\nlevel = INFO\n",
    )
    .unwrap();

    let err = ConfigLoader::new(&path)
        .with_environment(EnvironmentView::default())
        .load()
        .unwrap_err();
    assert_eq!(err.path(), path);
    assert!(matches!(
        err.kind(),
        ConfigError::Logging(LoggingError::SubscriberInstalled)
    ));
}
