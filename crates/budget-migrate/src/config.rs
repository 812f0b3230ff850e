//! Configuration management for budget-migrate.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Command-line database path
//! 2. Environment variables (BUDGET_*)
//! 3. Config file (platform config dir, or BUDGET_CONFIG)
//! 4. Default values

use anyhow::{Context, Result};
use budget_core::DEFAULT_DATABASE_FILE;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the budget database file
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// How long to wait for a locked database, in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

// Default value functions
fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_FILE)
}

fn default_busy_timeout_ms() -> u64 {
    30_000
}

fn default_config_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("app", "budget-tracker", "budget-tracker") {
        proj_dirs.config_dir().to_path_buf()
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".budget-tracker")
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::config_path())?;
        Ok(config.with_overrides(std::env::var("BUDGET_DATABASE_PATH").ok()))
    }

    /// Load configuration from a specific file; a missing file yields defaults.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))
    }

    /// Apply environment overrides
    pub fn with_overrides(mut self, database_path: Option<String>) -> Self {
        if let Some(path) = database_path.filter(|p| !p.trim().is_empty()) {
            self.database.path = PathBuf::from(path);
        }
        self
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("BUDGET_CONFIG") {
            PathBuf::from(path)
        } else {
            default_config_dir().join("config.toml")
        }
    }

    /// Database path to use, preferring an explicit command-line path
    pub fn database_path(&self, cli_path: Option<&Path>) -> PathBuf {
        cli_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.database.path.clone())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.database.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.database.path, PathBuf::from("budget_tracker.db"));
        assert_eq!(config.database.busy_timeout_ms, 30_000);
        assert_eq!(config.busy_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp = tempdir().expect("Failed to create temp dir");

        let loaded = Config::load_from(&temp.path().join("config.toml"))
            .expect("Failed to load default config");

        assert_eq!(loaded.database.path, PathBuf::from("budget_tracker.db"));
    }

    #[test]
    fn test_load_partial_file() {
        let temp = tempdir().expect("Failed to create temp dir");
        let config_path = temp.path().join("config.toml");
        std::fs::write(&config_path, "[database]\npath = \"/srv/budget/household.db\"\n")
            .expect("Failed to write config");

        let loaded = Config::load_from(&config_path).expect("Failed to load config");

        assert_eq!(loaded.database.path, PathBuf::from("/srv/budget/household.db"));
        // Unspecified fields keep their defaults
        assert_eq!(loaded.database.busy_timeout_ms, 30_000);
    }

    #[test]
    fn test_load_invalid_file_errors() {
        let temp = tempdir().expect("Failed to create temp dir");
        let config_path = temp.path().join("config.toml");
        std::fs::write(&config_path, "[database\npath = ").expect("Failed to write config");

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_path_precedence() {
        let config = Config {
            database: DatabaseConfig {
                path: PathBuf::from("from-file.db"),
                ..DatabaseConfig::default()
            },
        };

        // File value when nothing overrides it
        assert_eq!(config.database_path(None), PathBuf::from("from-file.db"));

        // Environment beats the file
        let config = config.with_overrides(Some("from-env.db".to_string()));
        assert_eq!(config.database_path(None), PathBuf::from("from-env.db"));

        // Command line beats everything
        assert_eq!(
            config.database_path(Some(Path::new("from-cli.db"))),
            PathBuf::from("from-cli.db")
        );
    }

    #[test]
    fn test_blank_env_override_ignored() {
        let config = Config::default().with_overrides(Some("  ".to_string()));
        assert_eq!(config.database.path, PathBuf::from("budget_tracker.db"));
    }
}
