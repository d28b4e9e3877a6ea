use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

use super::alerts::store::DEFAULT_ALERT_PROBABILITY;
use super::error::ConfigError;

/// Application settings, persisted as settings.json in the config directory.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Where the session slot lives
    pub data_dir: PathBuf,
    /// Alert generation tick
    #[serde(default = "default_alert_interval")]
    pub alert_interval_ms: u64,
    /// Chance that a generation tick produces an alert
    #[serde(default = "default_alert_probability")]
    pub alert_probability: f64,
    #[serde(default = "default_clock_interval")]
    pub clock_interval_ms: u64,
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval_ms: u64,
    /// EnvFilter directive used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_alert_interval() -> u64 {
    15_000
}

fn default_alert_probability() -> f64 {
    DEFAULT_ALERT_PROBABILITY
}

fn default_clock_interval() -> u64 {
    1_000
}

fn default_metrics_interval() -> u64 {
    5_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn alert_interval(&self) -> Duration {
        Duration::from_millis(self.alert_interval_ms.max(1))
    }

    pub fn clock_interval(&self) -> Duration {
        Duration::from_millis(self.clock_interval_ms.max(1))
    }

    pub fn metrics_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_interval_ms.max(1))
    }
}

impl Default for Settings {
    fn default() -> Self {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());

        Self {
            data_dir: PathBuf::from(home).join(".traffic-watch"),
            alert_interval_ms: default_alert_interval(),
            alert_probability: default_alert_probability(),
            clock_interval_ms: default_clock_interval(),
            metrics_interval_ms: default_metrics_interval(),
            log_level: default_log_level(),
        }
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Read settings.json. `Ok(None)` when there is no file yet.
    pub fn read(&self) -> Result<Option<Settings>, ConfigError> {
        let content = match fs::read_to_string(&self.config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Missing or unparsable settings fall back to defaults.
    pub fn load(&self) -> Settings {
        match self.read() {
            Ok(settings) => settings.unwrap_or_default(),
            Err(e) => {
                log::warn!("Ignoring {:?}: {}", self.config_path, e);
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)?;
        log::info!("Settings saved to {:?}", self.config_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());

        let default = manager.load();
        assert_eq!(default.alert_interval_ms, 15_000);
        assert_eq!(default.alert_probability, 0.3);

        let new_settings = Settings {
            data_dir: PathBuf::from("/tmp/traffic"),
            alert_interval_ms: 2_000,
            alert_probability: 0.9,
            clock_interval_ms: 500,
            metrics_interval_ms: 1_000,
            log_level: "debug".to_string(),
        };

        manager.save(&new_settings).unwrap();
        let loaded = manager.load();

        assert_eq!(loaded, new_settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), r#"{"data_dir": "/srv/tw"}"#).unwrap();

        let loaded = ConfigManager::new(dir.path().to_path_buf()).load();
        assert_eq!(loaded.data_dir, PathBuf::from("/srv/tw"));
        assert_eq!(loaded.metrics_interval(), Duration::from_secs(5));
        assert_eq!(loaded.log_level, "info");
    }

    #[test]
    fn test_garbage_file_uses_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), "not json").unwrap();

        let loaded = ConfigManager::new(dir.path().to_path_buf()).load();
        assert_eq!(loaded.clock_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());
        assert!(manager.read().unwrap().is_none());
    }

    #[test]
    fn test_read_reports_garbage_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), "{ not json").unwrap();

        let manager = ConfigManager::new(dir.path().to_path_buf());
        assert!(matches!(manager.read(), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_creates_missing_dir() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().join("nested").join("conf"));
        manager.save(&Settings::default()).unwrap();

        assert!(manager.path().exists());
        assert_eq!(manager.read().unwrap(), Some(Settings::default()));
    }
}
