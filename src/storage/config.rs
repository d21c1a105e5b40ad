use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::EngineSettings;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Convert to engine settings, rejecting values the engine cannot run with
    pub fn engine_settings(&self) -> Result<EngineSettings> {
        let settings = EngineSettings {
            max_history: self.general.max_history,
            poll_interval: Duration::from_millis(self.monitor.poll_interval_ms),
            retry_delay: Duration::from_millis(self.monitor.retry_delay_ms),
            cooldown: Duration::from_secs(self.monitor.cooldown_secs),
            max_consecutive_errors: self.monitor.max_consecutive_errors,
            shutdown_timeout: Duration::from_millis(self.monitor.shutdown_timeout_ms),
        };
        settings.validate().context("Invalid configuration")?;
        Ok(settings)
    }
}

/// General configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Maximum number of clipboard entries to keep
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Read from an in-memory clipboard instead of the system one
    #[serde(default)]
    pub headless: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            max_history: default_max_history(),
            headless: false,
        }
    }
}

/// Clipboard monitor timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,

    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            poll_interval_ms: default_poll_interval_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            cooldown_secs: default_cooldown_secs(),
            max_consecutive_errors: default_max_consecutive_errors(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

/// Log levels for the file and console sinks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_file_level")]
    pub file_level: String,

    #[serde(default = "default_console_level")]
    pub console_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            file_level: default_file_level(),
            console_level: default_console_level(),
        }
    }
}

// Default value functions for serde
fn default_max_history() -> usize {
    crate::engine::DEFAULT_MAX_HISTORY
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_retry_delay_ms() -> u64 {
    5_000
}

fn default_cooldown_secs() -> u64 {
    60
}

fn default_max_consecutive_errors() -> u32 {
    5
}

fn default_shutdown_timeout_ms() -> u64 {
    2_000
}

fn default_file_level() -> String {
    "info".to_string()
}

fn default_console_level() -> String {
    "warn".to_string()
}

/// Trait for configuration storage
pub trait ConfigStorage: Send + Sync {
    /// Load configuration from file
    fn load(&self) -> Result<Config>;

    /// Get the config file path
    fn path(&self) -> &PathBuf;

    /// Create default configuration file if it doesn't exist
    fn create_default(&self) -> Result<()>;
}

/// TOML-based implementation of ConfigStorage
pub struct TomlConfigStorage {
    path: PathBuf,
}

impl TomlConfigStorage {
    /// Create a new TomlConfigStorage with the given path
    pub fn new(path: PathBuf) -> Self {
        TomlConfigStorage { path }
    }
}

impl ConfigStorage for TomlConfigStorage {
    fn load(&self) -> Result<Config> {
        // If file doesn't exist, create default and return it
        if !self.path.exists() {
            log::info!(
                "Config file not found at {:?}, creating default configuration",
                self.path
            );
            self.create_default()?;
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config from {:?}", self.path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", self.path))?;

        log::info!("Loaded configuration from {:?}", self.path);
        log::debug!(
            "Config: max_history={}, poll_interval_ms={}",
            config.general.max_history,
            config.monitor.poll_interval_ms
        );

        Ok(config)
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn create_default(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        // Use the example config compiled into the binary
        let example_config = include_str!("../../multiclip.toml.example");

        fs::write(&self.path, example_config)
            .with_context(|| format!("Failed to create default config at {:?}", self.path))?;

        log::info!("Created default configuration at {:?}", self.path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.general.max_history, 25);
        assert!(!config.general.headless);
        assert_eq!(config.monitor.poll_interval_ms, 500);
        assert_eq!(config.monitor.retry_delay_ms, 5_000);
        assert_eq!(config.monitor.cooldown_secs, 60);
        assert_eq!(config.monitor.max_consecutive_errors, 5);
        assert_eq!(config.monitor.shutdown_timeout_ms, 2_000);
        assert_eq!(config.logging.file_level, "info");
    }

    #[test]
    fn test_defaults_match_engine_defaults() {
        let settings = Config::default().engine_settings().unwrap();
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let toml_str = r#"
        [general]
        max_history = 3

        [monitor]
        cooldown_secs = 10
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.max_history, 3);
        assert_eq!(config.monitor.cooldown_secs, 10);
        assert_eq!(config.monitor.poll_interval_ms, 500);
        assert_eq!(config.logging.console_level, "warn");
    }

    #[test]
    fn test_zero_history_rejected() {
        let toml_str = r#"
        [general]
        max_history = 0
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.engine_settings().is_err());
    }

    #[test]
    fn test_example_config_parses_to_defaults() {
        let config: Config = toml::from_str(include_str!("../../multiclip.toml.example")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_file_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("multiclip.toml");
        let storage = TomlConfigStorage::new(path.clone());

        let config = storage.load().unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_rendered_config_parses_back() {
        let mut config = Config::default();
        config.general.max_history = 7;
        config.monitor.shutdown_timeout_ms = 250;

        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
