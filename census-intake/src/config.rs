//! Configuration resolution for census-intake
//!
//! Combines command-line overrides with the shared TOML configuration.
//! Priority: CLI flag (which clap also fills from its environment variable)
//! → environment → TOML → compiled default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use census_common::config::{self as common_config, TomlConfig, DEFAULT_BIND_ADDRESS};
use census_common::{Error, Result};

use crate::pipeline::DedupKey;
use crate::watcher::WatcherConfig;

/// Values supplied on the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides<'a> {
    pub root_folder: Option<&'a Path>,
    pub watch_root: Option<&'a Path>,
    pub bind_address: Option<&'a str>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub bind_address: String,
    /// `None` when no watch root is configured
    pub watcher: Option<WatcherConfig>,
    pub dedup_key: DedupKey,
}

impl IntakeConfig {
    pub fn resolve(cli: CliOverrides<'_>, toml_config: &TomlConfig) -> Result<Self> {
        let root_folder = common_config::resolve_root_folder(cli.root_folder, toml_config);
        let database_path = common_config::database_path(&root_folder);

        let bind_address = cli
            .bind_address
            .map(str::to_string)
            .or_else(|| toml_config.bind_address.clone())
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let watcher = common_config::resolve_watch_root(cli.watch_root, toml_config)
            .map(|watch_root| watcher_config(watch_root, toml_config))
            .transpose()?;

        let dedup_key = match &toml_config.dedup_key {
            Some(names) => DedupKey::from_names(names.as_slice()).map_err(Error::Config)?,
            None => DedupKey::FullRecord,
        };

        Ok(Self {
            root_folder,
            database_path,
            bind_address,
            watcher,
            dedup_key,
        })
    }
}

fn watcher_config(watch_root: PathBuf, toml_config: &TomlConfig) -> Result<WatcherConfig> {
    let mut config = WatcherConfig::new(watch_root);

    if let Some(secs) = toml_config.poll_interval_secs {
        if secs == 0 {
            return Err(Error::Config("poll_interval_secs must be at least 1".to_string()));
        }
        config.poll_interval = Duration::from_secs(secs);
    }

    if let Some(capacity) = toml_config.queue_capacity {
        if capacity == 0 {
            return Err(Error::Config("queue_capacity must be at least 1".to_string()));
        }
        config.queue_capacity = capacity;
    }

    config.process_existing = toml_config.process_existing.unwrap_or(false);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CanonicalField;

    #[test]
    fn test_cli_overrides_toml() {
        let toml_config = TomlConfig {
            root_folder: Some(PathBuf::from("/toml/root")),
            watch_root: Some(PathBuf::from("/toml/drop")),
            bind_address: Some("0.0.0.0:9000".to_string()),
            ..Default::default()
        };
        let cli = CliOverrides {
            root_folder: Some(Path::new("/cli/root")),
            watch_root: Some(Path::new("/cli/drop")),
            bind_address: Some("127.0.0.1:6000"),
        };

        let config = IntakeConfig::resolve(cli, &toml_config).unwrap();

        assert_eq!(config.root_folder, PathBuf::from("/cli/root"));
        assert_eq!(config.database_path, PathBuf::from("/cli/root/census.db"));
        assert_eq!(config.bind_address, "127.0.0.1:6000");
        assert_eq!(config.watcher.unwrap().watch_root, PathBuf::from("/cli/drop"));
    }

    #[test]
    fn test_toml_watcher_settings_and_dedup_key() {
        let toml_config = TomlConfig::from_toml_str(
            r#"
            root_folder = "/srv/census"
            watch_root = "/srv/drop"
            poll_interval_secs = 2
            queue_capacity = 8
            process_existing = true
            dedup_key = ["email"]
            "#,
        )
        .unwrap();
        let cli = CliOverrides {
            root_folder: Some(Path::new("/srv/census")),
            watch_root: Some(Path::new("/srv/drop")),
            ..Default::default()
        };

        let config = IntakeConfig::resolve(cli, &toml_config).unwrap();

        let watcher = config.watcher.unwrap();
        assert_eq!(watcher.poll_interval, Duration::from_secs(2));
        assert_eq!(watcher.queue_capacity, 8);
        assert!(watcher.process_existing);
        assert_eq!(config.dedup_key, DedupKey::Fields(vec![CanonicalField::Email]));
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let cli = CliOverrides {
            root_folder: Some(Path::new("/r")),
            watch_root: Some(Path::new("/w")),
            ..Default::default()
        };

        let zero_interval = TomlConfig {
            poll_interval_secs: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            IntakeConfig::resolve(cli, &zero_interval),
            Err(Error::Config(_))
        ));

        let bad_key = TomlConfig {
            dedup_key: Some(vec!["shoe_size".to_string()]),
            ..Default::default()
        };
        assert!(matches!(IntakeConfig::resolve(cli, &bad_key), Err(Error::Config(_))));
    }
}
