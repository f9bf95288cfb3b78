//! Integration tests for the `config` subcommands.
//!
//! Responsibilities:
//! - Test `config show`, `config get`, and `config chain` output.
//! - Test exit codes for missing keys and broken chains.

mod common;

use common::{ckan_cmd, write_chain, write_config};
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_config_show_text() {
    let temp = TempDir::new().unwrap();
    let root = write_chain(temp.path());
    let storage = temp.path().join("storage");

    ckan_cmd()
        .args(["-c", root.to_str().unwrap(), "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ckan.site_url = https://data.example.org"))
        .stdout(predicate::str::contains(format!(
            "ckan.storage_path = {}",
            storage.display()
        )))
        .stdout(predicate::str::contains("debug = true"))
        .stdout(predicate::str::contains("ckan.plugins = stats\n    text_view\n"))
        .stdout(predicate::str::contains(format!("__file__ = {}", root.display())));
}

#[test]
fn test_config_show_json() {
    let temp = TempDir::new().unwrap();
    let root = write_chain(temp.path());

    let output = ckan_cmd()
        .args(["-c", root.to_str().unwrap(), "config", "show", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["ckan.site_url"], "https://data.example.org");
    assert_eq!(json["here"], temp.path().join("site").display().to_string());
    assert_eq!(json["__file__"], root.display().to_string());
}

#[test]
fn test_config_show_rejects_unknown_format() {
    let temp = TempDir::new().unwrap();
    let root = write_chain(temp.path());

    ckan_cmd()
        .args(["-c", root.to_str().unwrap(), "config", "show", "-f", "yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid output format"));
}

#[test]
fn test_config_get_prints_value() {
    let temp = TempDir::new().unwrap();
    let root = write_chain(temp.path());

    ckan_cmd()
        .args(["-c", root.to_str().unwrap(), "config", "get", "ckan.site_url"])
        .assert()
        .success()
        .stdout("https://data.example.org\n");
}

#[test]
fn test_config_get_missing_key_exits_not_found() {
    let temp = TempDir::new().unwrap();
    let root = write_chain(temp.path());

    ckan_cmd()
        .args(["-c", root.to_str().unwrap(), "config", "get", "host"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Missing config key: host"));
}

#[test]
fn test_config_chain_lists_base_first() {
    let temp = TempDir::new().unwrap();
    let root = write_chain(temp.path());
    let base = temp.path().join("base.ini");

    ckan_cmd()
        .args(["-c", root.to_str().unwrap(), "config", "chain"])
        .assert()
        .success()
        .stdout(format!("{}\n{}\n", base.display(), root.display()));
}

#[test]
fn test_cyclic_chain_exits_with_config_error() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path(), "b.ini", "[app:main]\nuse = config:a.ini\n");
    let a = write_config(temp.path(), "a.ini", "[app:main]\nuse = config:b.ini\n");

    ckan_cmd()
        .args(["-c", a.to_str().unwrap(), "config", "show"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Cyclic config chain"));
}

#[test]
fn test_missing_reference_exits_with_config_error() {
    let temp = TempDir::new().unwrap();
    let path = write_config(temp.path(), "site.ini", "[app:main]\nurl = %(nowhere)s\n");

    ckan_cmd()
        .args(["-c", path.to_str().unwrap(), "config", "get", "url"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Bad value substitution"))
        .stderr(predicate::str::contains("\"nowhere\""));
}

#[test]
fn test_environment_fallback_through_cli() {
    let temp = TempDir::new().unwrap();
    let path = write_config(temp.path(), "site.ini", "[app:main]\nvar = %(TEST_ENV_VAR)s\n");

    ckan_cmd()
        .env("CKAN_TEST_ENV_VAR", "value")
        .args(["-c", path.to_str().unwrap(), "config", "get", "var"])
        .assert()
        .success()
        .stdout("value\n");
}
