//! Configuration management for helpdeskd.
//!
//! Loads settings from `--config` / `$HELPDESK_CONFIG`, else the first of
//! /etc/helpdesk/config.toml and /var/lib/helpdesk/config.toml that exists,
//! else built-in defaults. Nothing here logs: the daemon reads its config
//! before the subscriber is installed and reports the outcome afterwards.

use anyhow::{Context, Result};
use helpdesk_shared::booking::ZoomAccount;
use helpdesk_shared::clock::{ClockTime, WorkingHours};
use helpdesk_shared::{DEFAULT_BIND_ADDR, STATE_DIR};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config location
pub const CONFIG_ENV: &str = "HELPDESK_CONFIG";

/// Config file path
pub const CONFIG_PATH: &str = "/etc/helpdesk/config.toml";

/// Fallback config file path
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/helpdesk/config.toml";

/// HTTP listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Which repository implementation backs the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per collection under `data_dir`
    #[default]
    File,
    /// Process memory only; lost on restart
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Create the default users and Zoom accounts when their collections
    /// are empty
    #[serde(default = "default_seed")]
    pub seed_defaults: bool,
}

fn default_data_dir() -> PathBuf {
    Path::new(STATE_DIR).join("data")
}

fn default_seed() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
            seed_defaults: default_seed(),
        }
    }
}

/// Meeting booking window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    #[serde(default = "default_hours_start")]
    pub working_hours_start: ClockTime,

    #[serde(default = "default_hours_end")]
    pub working_hours_end: ClockTime,
}

fn default_hours_start() -> ClockTime {
    WorkingHours::default().start
}

fn default_hours_end() -> ClockTime {
    WorkingHours::default().end
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            working_hours_start: default_hours_start(),
            working_hours_end: default_hours_end(),
        }
    }
}

impl BookingConfig {
    pub fn working_hours(&self) -> WorkingHours {
        WorkingHours::new(self.working_hours_start, self.working_hours_end)
    }
}

/// Zoom account seeded on first start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoomAccountSeed {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl ZoomAccountSeed {
    pub fn to_account(&self) -> ZoomAccount {
        ZoomAccount::new(&self.id, &self.name, &self.email)
    }
}

fn default_zoom_accounts() -> Vec<ZoomAccountSeed> {
    (1..=3)
        .map(|n| ZoomAccountSeed {
            id: format!("zoom-{}", n),
            name: format!("Zoom {}", n),
            email: format!("zoom{}@helpdesk.local", n),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter; `RUST_LOG` wins when set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Main daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub booking: BookingConfig,

    #[serde(default = "default_zoom_accounts")]
    pub zoom_accounts: Vec<ZoomAccountSeed>,

    #[serde(default)]
    pub log: LogConfig,

    /// File this config was read from; `None` for built-in defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            booking: BookingConfig::default(),
            zoom_accounts: default_zoom_accounts(),
            log: LogConfig::default(),
            source: None,
        }
    }
}

impl Config {
    /// Load the config named on the command line, or the first file
    /// present among the default locations. Built-in defaults when none
    /// exists; a file that exists but fails to parse is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => Self::load_first(&[Path::new(CONFIG_PATH), Path::new(DEFAULT_CONFIG_PATH)]),
        }
    }

    /// Load the first of `paths` that exists
    pub fn load_first(paths: &[&Path]) -> Result<Self> {
        match paths.iter().find(|p| p.exists()) {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from a specific path
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let hours = self.booking.working_hours();
        if hours.end <= hours.start {
            anyhow::bail!(
                "working_hours_end {} must be after working_hours_start {}",
                hours.end,
                hours.start
            );
        }
        Ok(())
    }

    /// Save default config to path (for init)
    pub fn save_default(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(&Config::default())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind_addr, "127.0.0.1:7870");
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.booking.working_hours(), WorkingHours::default());
        assert_eq!(config.zoom_accounts.len(), 3);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[server]
bind_addr = "0.0.0.0:8080"

[storage]
backend = "memory"

[booking]
working_hours_start = "08:00"

[[zoom_accounts]]
id = "z-main"
name = "Zoom Utama"
"#;
        let config = Config::parse(toml_str).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        // Defaults for missing fields
        assert!(config.storage.seed_defaults);
        assert_eq!(config.booking.working_hours_start.to_string(), "08:00");
        assert_eq!(config.booking.working_hours_end.to_string(), "17:00");
        assert_eq!(config.zoom_accounts.len(), 1);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_rejects_inverted_hours() {
        let toml_str = r#"
[booking]
working_hours_start = "17:00"
working_hours_end = "07:00"
"#;
        assert!(Config::parse(toml_str).is_err());
    }

    #[test]
    fn test_save_default_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etc/config.toml");
        Config::save_default(&path).unwrap();
        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.server.bind_addr, Config::default().server.bind_addr);
        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_first_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let present = dir.path().join("config.toml");
        fs::write(&present, "[server]\nbind_addr = \"0.0.0.0:9000\"\n").unwrap();

        let config = Config::load_first(&[missing.as_path(), present.as_path()]).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.source.as_deref(), Some(present.as_path()));

        let config = Config::load_first(&[missing.as_path()]).unwrap();
        assert!(config.source.is_none());
    }

    #[test]
    fn test_malformed_file_is_reported_not_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("config.toml");
        let fallback = dir.path().join("fallback.toml");
        fs::write(&broken, "[server\nbind_addr = ").unwrap();
        Config::save_default(&fallback).unwrap();

        let err = Config::load_first(&[broken.as_path(), fallback.as_path()]).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));
        assert!(Config::load(Some(dir.path().join("nope.toml").as_path())).is_err());
    }
}
