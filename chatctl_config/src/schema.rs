use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const CONFIG_DIR: &str = "chatctl";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
        }
    }
}

impl DatabaseConfig {
    fn default_url() -> String {
        "sqlite://chatctl.db?mode=rwc".to_string()
    }
}

/// Timing of the background maintenance loop.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchedulerSettings {
    #[serde(default = "SchedulerSettings::default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub run_on_startup: bool,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            interval_secs: Self::default_interval_secs(),
            run_on_startup: false,
        }
    }
}

impl SchedulerSettings {
    const fn default_interval_secs() -> u64 {
        60 * 60
    }

    /// Never zero: a zero interval would spin the loop.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RetentionConfig {
    #[serde(default = "RetentionConfig::default_max_idle_days")]
    pub max_idle_days: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_idle_days: Self::default_max_idle_days(),
        }
    }
}

impl RetentionConfig {
    const fn default_max_idle_days() -> u32 {
        30
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StatusConfig {
    /// Buffered status events per subscriber before it starts lagging.
    #[serde(default = "StatusConfig::default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: Self::default_channel_capacity(),
        }
    }
}

impl StatusConfig {
    const fn default_channel_capacity() -> usize {
        64
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Config {
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR)
            .join(CONFIG_FILE))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'chatctl init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)?;
        debug!("Loaded config from {}", config_path.display());
        Self::from_json(&content)
    }

    /// Load the config file if present, otherwise fall back to defaults.
    pub fn load_or_default() -> anyhow::Result<Self> {
        if Self::config_path()?.exists() {
            Self::load()
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR);

        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<PathBuf> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "database": {
    "url": "sqlite://chatctl.db?mode=rwc"
  },
  "scheduler": {
    "interval_secs": 3600,
    "run_on_startup": false
  },
  "retention": {
    "max_idle_days": 30
  },
  "status": {
    "channel_capacity": 64
  },
  "logging": {
    "level": "info"
  }
}"#;

        std::fs::write(&config_path, config_template)?;
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = Config::from_json("{}").unwrap();

        assert_eq!(config.scheduler.interval(), Duration::from_secs(3600));
        assert!(!config.scheduler.run_on_startup);
        assert_eq!(config.retention.max_idle_days, 30);
        assert_eq!(config.status.channel_capacity, 64);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_json(
            r#"{"scheduler": {"run_on_startup": true}, "database": {"url": "postgres://db/chat"}}"#,
        )
        .unwrap();

        assert!(config.scheduler.run_on_startup);
        assert_eq!(config.scheduler.interval_secs, 3600);
        assert_eq!(config.database.url, "postgres://db/chat");
    }

    #[test]
    fn zero_interval_is_clamped() {
        let config = Config::from_json(r#"{"scheduler": {"interval_secs": 0}}"#).unwrap();
        assert_eq!(config.scheduler.interval(), Duration::from_secs(1));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Config::from_json("{\"scheduler\": ").is_err());
    }
}
