//! Property-based tests for chained configuration loading.
//!
//! These tests write randomly generated configuration files to disk and
//! check the invariants of a load against them.
//!
//! Test coverage:
//! - Override merge: the root file wins, base-only keys are inherited
//! - `__file__` always names the root and `here` the nearest file
//! - `%%` escapes survive as a single `%`
//! - Unprefixed environment variables never satisfy a reference

use std::collections::BTreeMap;
use std::path::Path;

use proptest::prelude::*;
use tempfile::TempDir;

use ckan_config::{ConfigError, ConfigLoader, EnvironmentView};

/// Strategy for configuration keys (dotted, lowercase; reserved keys excluded).
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}(\\.[a-z][a-z0-9_]{0,8}){0,2}"
        .prop_filter("reserved key", |k| !matches!(k.as_str(), "here" | "use"))
}

/// Strategy for plain values: no `%`, no leading/trailing whitespace.
fn value_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9/:._-]{0,20}"
}

fn mapping_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 0..12)
}

fn render(use_directive: Option<&str>, values: &BTreeMap<String, String>) -> String {
    let mut text = String::from("[app:main]\n");
    if let Some(directive) = use_directive {
        text.push_str(&format!("use = {directive}\n"));
    }
    for (key, value) in values {
        text.push_str(&format!("{key} = {value}\n"));
    }
    text
}

fn load(path: &Path, env: EnvironmentView) -> Result<ckan_config::MergedConfig, ckan_config::ConfigurationError> {
    ConfigLoader::new(path)
        .with_environment(env)
        .without_logging()
        .load()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_root_overrides_base(base in mapping_strategy(), root in mapping_strategy()) {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("base")).unwrap();
        std::fs::write(temp.path().join("base/base.ini"), render(None, &base)).unwrap();
        let root_path = temp.path().join("root.ini");
        std::fs::write(&root_path, render(Some("config:base/base.ini"), &root)).unwrap();

        let conf = load(&root_path, EnvironmentView::default()).unwrap();

        let mut expected = base.clone();
        expected.extend(root.clone());
        for (key, value) in &expected {
            prop_assert_eq!(conf.get(key), Some(value.as_str()));
        }
        prop_assert_eq!(conf.file(), Some(root_path.clone()));
        prop_assert_eq!(conf.here(), Some(temp.path().to_path_buf()));
        // Only the generated keys plus `use`, `here` and `__file__`.
        prop_assert_eq!(conf.len(), expected.len() + 3);
    }

    #[test]
    fn prop_percent_escape_is_literal(prefix in "[a-z ]{0,10}", suffix in "[a-z ]{0,10}") {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("site.ini");
        std::fs::write(&path, format!("[app:main]\nrate = x{prefix}%%{suffix}x\n")).unwrap();

        let conf = load(&path, EnvironmentView::default()).unwrap();
        let expected = format!("x{prefix}%{suffix}x");
        prop_assert_eq!(conf.get("rate"), Some(expected.as_str()));
    }

    #[test]
    fn prop_unprefixed_environment_is_invisible(name in "[A-Z][A-Z0-9_]{0,12}", value in "[a-z]{1,8}") {
        prop_assume!(!name.starts_with("CKAN_") && name != "HERE");
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("site.ini");
        std::fs::write(&path, format!("[app:main]\nvar = %({name})s\n")).unwrap();

        let hidden = EnvironmentView::from_vars("CKAN_", [(name.clone(), value.clone())]);
        let err = load(&path, hidden).unwrap_err();
        let is_missing = matches!(err.kind(), ConfigError::InterpolationMissingOption { .. });
        prop_assert!(is_missing);

        let visible = EnvironmentView::from_vars("CKAN_", [(format!("CKAN_{name}"), value.clone())]);
        let conf = load(&path, visible).unwrap();
        prop_assert_eq!(conf.get("var"), Some(value.as_str()));
    }
}
