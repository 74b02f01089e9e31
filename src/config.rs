//! Configuration module

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::path::PathBuf;
use uuid::Uuid;

use crate::models::Platform;
use crate::paths;
use crate::theme::Theme;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Selected theme
    #[serde(default)]
    pub theme: Theme,

    /// Brand selected in the last session
    #[serde(default)]
    pub selected_brand_id: Option<Uuid>,

    /// Time given to new posts when none is entered (HH:MM)
    #[serde(default = "default_time")]
    pub default_time: String,

    /// Platform given to new posts when none is entered
    #[serde(default)]
    pub default_platform: Platform,

    /// PDF report settings
    #[serde(default)]
    pub report: ReportSettings,

    /// Marketing API settings
    #[serde(default)]
    pub api: ApiSettings,
}

/// PDF report settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Name printed in every page footer
    #[serde(default = "default_agency")]
    pub agency: String,

    /// Currency symbol for budgets
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Post badges drawn per calendar day before `+N more...`
    #[serde(default = "default_badges_per_day")]
    pub badges_per_day: usize,
}

/// Marketing API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Days fetched when no range is given
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
}

fn default_time() -> String {
    "09:00".to_string()
}

fn default_agency() -> String {
    "Warp CR - Digital Agency".to_string()
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_badges_per_day() -> usize {
    2
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_lookback_days() -> u32 {
    30
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            agency: default_agency(),
            currency: default_currency(),
            badges_per_day: default_badges_per_day(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            lookback_days: default_lookback_days(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            selected_brand_id: None,
            default_time: default_time(),
            default_platform: Platform::default(),
            report: ReportSettings::default(),
            api: ApiSettings::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        paths::config_path()
    }

    /// Load config from the default path or create default
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Parsed default post time (09:00 if the configured value is invalid)
    pub fn default_post_time(&self) -> NaiveTime {
        crate::schedule::parse_post_time(&self.default_time)
            .or_else(|| NaiveTime::from_hms_opt(9, 0, 0))
            .unwrap_or(NaiveTime::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.report.agency, "Warp CR - Digital Agency");
        assert_eq!(config.api.lookback_days, 30);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_platform = \"tiktok\"\n[report]\ncurrency = \"€\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_platform, Platform::TikTok);
        assert_eq!(config.report.currency, "€");
        assert_eq!(config.report.badges_per_day, 2);
        assert_eq!(config.default_time, "09:00");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            selected_brand_id: Some(Uuid::new_v4()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_default_time_falls_back() {
        let config = Config {
            default_time: "lunch".to_string(),
            ..Config::default()
        };
        assert_eq!(config.default_post_time(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    }
}
