//! Unit tests for configuration resolution and graceful degradation
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate CENSUS_ROOT_FOLDER or CENSUS_WATCH_ROOT are marked
//! with #[serial].

use census_common::config::{
    database_path, ensure_root_folder, resolve_root_folder, resolve_watch_root, LoggingConfig,
    TomlConfig, ROOT_FOLDER_ENV, WATCH_ROOT_ENV,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_toml_config_parses_all_keys() {
    let content = r#"
        root_folder = "/var/lib/census"
        watch_root = "/srv/sftp/unions"
        bind_address = "0.0.0.0:5780"
        poll_interval_secs = 10
        queue_capacity = 16
        process_existing = true
        dedup_key = ["email", "last_name"]

        [logging]
        level = "debug"
    "#;

    let config = TomlConfig::from_toml_str(content).unwrap();

    assert_eq!(config.root_folder, Some(PathBuf::from("/var/lib/census")));
    assert_eq!(config.watch_root, Some(PathBuf::from("/srv/sftp/unions")));
    assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0:5780"));
    assert_eq!(config.poll_interval_secs, Some(10));
    assert_eq!(config.queue_capacity, Some(16));
    assert_eq!(config.process_existing, Some(true));
    assert_eq!(
        config.dedup_key,
        Some(vec!["email".to_string(), "last_name".to_string()])
    );
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_empty_toml_uses_defaults() {
    let config = TomlConfig::from_toml_str("").unwrap();
    assert_eq!(config, TomlConfig::default());
    assert_eq!(config.logging, LoggingConfig::default());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_malformed_toml_is_config_error() {
    let result = TomlConfig::from_toml_str("poll_interval_secs = \"soon\"");
    assert!(matches!(result, Err(census_common::Error::Config(_))));
}

#[test]
fn test_load_from_missing_file_is_error() {
    let result = TomlConfig::load_from(Path::new("/nonexistent/census/config.toml"));
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_root_folder_cli_argument_wins() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/census-env-root");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/census-toml-root")),
        ..Default::default()
    };

    let resolved = resolve_root_folder(Some(Path::new("/tmp/census-cli-root")), &toml);
    assert_eq!(resolved, PathBuf::from("/tmp/census-cli-root"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_root_folder_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/census-env-root");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/census-toml-root")),
        ..Default::default()
    };

    let resolved = resolve_root_folder(None, &toml);
    assert_eq!(resolved, PathBuf::from("/tmp/census-env-root"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_root_folder_falls_back_to_toml_then_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/census-toml-root")),
        ..Default::default()
    };
    assert_eq!(
        resolve_root_folder(None, &toml),
        PathBuf::from("/tmp/census-toml-root")
    );

    let default_root = resolve_root_folder(None, &TomlConfig::default());
    assert!(!default_root.as_os_str().is_empty());
}

#[test]
#[serial]
fn test_watch_root_unset_disables_watcher() {
    env::remove_var(WATCH_ROOT_ENV);
    assert_eq!(resolve_watch_root(None, &TomlConfig::default()), None);
}

#[test]
#[serial]
fn test_watch_root_env_beats_toml() {
    env::set_var(WATCH_ROOT_ENV, "/srv/sftp/env");
    let toml = TomlConfig {
        watch_root: Some(PathBuf::from("/srv/sftp/toml")),
        ..Default::default()
    };

    assert_eq!(
        resolve_watch_root(None, &toml),
        Some(PathBuf::from("/srv/sftp/env"))
    );

    env::remove_var(WATCH_ROOT_ENV);
    assert_eq!(
        resolve_watch_root(None, &toml),
        Some(PathBuf::from("/srv/sftp/toml"))
    );
}

#[test]
fn test_ensure_root_folder_creates_missing_directory() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("nested").join("census");

    ensure_root_folder(&root).unwrap();

    assert!(root.is_dir());
    assert_eq!(database_path(&root), root.join("census.db"));
}

#[test]
fn test_ensure_root_folder_rejects_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("not-a-dir");
    std::fs::write(&file, b"x").unwrap();

    assert!(ensure_root_folder(&file).is_err());
}
