//! Configuration management with layered hierarchy

use miette::Diagnostic;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::store::Backend;
use crate::core::workspace::Workspace;
use crate::entities::transaction::DEFAULT_LOAN_PERIOD_DAYS;

/// Trove configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Persistence backend
    pub backend: Option<Backend>,

    /// Directory holding the record files or database
    pub data_dir: Option<PathBuf>,

    /// Library loan period in days
    pub loan_period_days: Option<u32>,

    /// Default output format
    pub default_format: Option<String>,
}

/// Errors raised while resolving configuration
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}")]
    #[diagnostic(code(trove::config::invalid))]
    InvalidValue { key: &'static str, value: String },

    #[error("no data directory configured and no trove workspace found")]
    #[diagnostic(
        code(trove::config::no_data_dir),
        help("run 'trove init', pass --data-dir or set TROVE_DATA_DIR")
    )]
    NoDataDir,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Result<Self, ConfigError> {
        let workspace = Workspace::discover().ok();
        Self::load_with(workspace.as_ref(), |key| std::env::var(key).ok())
    }

    /// Load with an explicit workspace and environment lookup
    pub fn load_with<F>(workspace: Option<&Workspace>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/trove/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Workspace config (.trove/config.yaml)
        if let Some(workspace) = workspace {
            if let Some(mut local) = Self::read_file(&workspace.config_path()) {
                local.data_dir = local.data_dir.map(|dir| workspace.resolve(&dir));
                config.merge(local);
            }
        }

        // 4. Environment variables
        config.apply_env(env)?;

        if config.loan_period_days == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "loan_period_days",
                value: "0".to_string(),
            });
        }

        Ok(config)
    }

    /// Parse a config file, skipping it when missing or unreadable
    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str::<Config>(&contents).ok()
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "trove")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.backend.is_some() {
            self.backend = other.backend;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.loan_period_days.is_some() {
            self.loan_period_days = other.loan_period_days;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    fn apply_env<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = env("TROVE_BACKEND") {
            let backend = match value.to_lowercase().as_str() {
                "file" => Backend::File,
                "sqlite" => Backend::Sqlite,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "TROVE_BACKEND",
                        value,
                    })
                }
            };
            self.backend = Some(backend);
        }
        if let Some(value) = env("TROVE_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = env("TROVE_LOAN_PERIOD_DAYS") {
            let days = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "TROVE_LOAN_PERIOD_DAYS",
                value: value.clone(),
            })?;
            self.loan_period_days = Some(days);
        }
        Ok(())
    }

    /// Configured backend, file by default
    pub fn backend(&self) -> Backend {
        self.backend.unwrap_or_default()
    }

    /// Configured loan period, 14 days by default
    pub fn loan_period_days(&self) -> u32 {
        self.loan_period_days.unwrap_or(DEFAULT_LOAN_PERIOD_DAYS)
    }

    /// Data directory: configured value, else the workspace default
    pub fn data_dir(&self, workspace: Option<&Workspace>) -> Result<PathBuf, ConfigError> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        workspace
            .map(Workspace::default_data_dir)
            .ok_or(ConfigError::NoDataDir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend(), Backend::File);
        assert_eq!(config.loan_period_days(), 14);
        assert!(matches!(config.data_dir(None), Err(ConfigError::NoDataDir)));
    }

    #[test]
    fn test_workspace_config_and_relative_data_dir() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path(), false).unwrap();
        std::fs::write(
            workspace.config_path(),
            "backend: sqlite\ndata_dir: records\nloan_period_days: 21\n",
        )
        .unwrap();

        let config = Config::load_with(Some(&workspace), env_from(&[])).unwrap();
        assert_eq!(config.backend(), Backend::Sqlite);
        assert_eq!(config.loan_period_days(), 21);
        assert_eq!(
            config.data_dir(Some(&workspace)).unwrap(),
            workspace.root().join("records")
        );
    }

    #[test]
    fn test_env_overrides_file() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path(), false).unwrap();

        let config = Config::load_with(
            Some(&workspace),
            env_from(&[("TROVE_BACKEND", "SQLite"), ("TROVE_LOAN_PERIOD_DAYS", "7")]),
        )
        .unwrap();
        assert_eq!(config.backend(), Backend::Sqlite);
        assert_eq!(config.loan_period_days(), 7);
        assert_eq!(
            config.data_dir(Some(&workspace)).unwrap(),
            workspace.default_data_dir()
        );
    }

    #[test]
    fn test_invalid_env_values() {
        let err = Config::load_with(None, env_from(&[("TROVE_BACKEND", "postgres")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "TROVE_BACKEND", .. }));

        let err =
            Config::load_with(None, env_from(&[("TROVE_LOAN_PERIOD_DAYS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_malformed_workspace_config_is_skipped() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path(), false).unwrap();
        std::fs::write(workspace.config_path(), "backend: [unterminated").unwrap();

        let config = Config::load_with(Some(&workspace), env_from(&[])).unwrap();
        assert_eq!(config.backend(), Backend::File);
    }
}
