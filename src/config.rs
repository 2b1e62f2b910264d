// Allow dead code: Infrastructure methods for future use
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::roster::FilterState;

const APP_DIR: &str = "tornwatch";
const CONFIG_FILE: &str = "config.json";

/// Default polling interval in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 10;

/// Shortest allowed polling interval. Torn rate-limits aggressively
/// below this.
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 5;

/// Longest allowed polling interval.
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 300;

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

/// Persistent settings, stored as JSON in the platform config dir.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds between background refreshes, clamped to 5..=300.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Manual override for the opposing faction. When unset, the id is
    /// derived from the current ranked war.
    pub enemy_faction_id: Option<i64>,
    /// Roster filters, restored across sessions.
    pub filters: FilterState,
    /// Player ids pinned to the top of the roster.
    pub pinned: Vec<i64>,
    /// Collapse the overview cards to give the roster more rows.
    pub collapsed_cards: bool,
    /// Write target override; tests use it to keep saves off the real
    /// config file.
    #[serde(skip)]
    save_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            enemy_faction_id: None,
            filters: FilterState::default(),
            pinned: Vec::new(),
            collapsed_cards: false,
            save_path: None,
        }
    }
}

impl Config {
    /// Load from disk, falling back to defaults if the file is missing
    /// or unreadable.
    pub fn load() -> Self {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Self::default(),
        };

        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Config>(&contents) {
                Ok(mut config) => {
                    config.clamp_interval();
                    config
                }
                Err(e) => {
                    debug!(error = %e, "Failed to parse config file, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                debug!(error = %e, "Failed to read config file, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = match self.save_path {
            Some(ref p) => p.clone(),
            None => Self::config_path()?,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents =
            serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, contents).context("Failed to write config file")
    }

    fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Platform cache dir for data snapshots.
    pub fn cache_dir() -> Result<PathBuf> {
        let dir = dirs::cache_dir().context("Could not determine cache directory")?;
        Ok(dir.join(APP_DIR))
    }

    fn clamp_interval(&mut self) {
        self.refresh_interval_secs = self
            .refresh_interval_secs
            .clamp(MIN_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS);
    }

    /// Step the refresh interval by `delta` seconds, staying in bounds.
    pub fn adjust_interval(&mut self, delta: i64) {
        let next = self.refresh_interval_secs as i64 + delta;
        self.refresh_interval_secs =
            (next.max(0) as u64).clamp(MIN_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS);
    }
}

#[cfg(test)]
impl Config {
    /// Default config whose saves go to `path` instead of the real
    /// config file.
    pub(crate) fn scratch(path: PathBuf) -> Self {
        Self { save_path: Some(path), ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.refresh_interval_secs, 10);
        assert!(config.enemy_faction_id.is_none());
        assert!(config.filters.is_empty());
        assert!(config.pinned.is_empty());
        assert!(!config.collapsed_cards);
    }

    #[test]
    fn test_interval_clamping() {
        let mut config = Config { refresh_interval_secs: 1, ..Config::default() };
        config.clamp_interval();
        assert_eq!(config.refresh_interval_secs, MIN_REFRESH_INTERVAL_SECS);

        config.refresh_interval_secs = 10_000;
        config.clamp_interval();
        assert_eq!(config.refresh_interval_secs, MAX_REFRESH_INTERVAL_SECS);
    }

    #[test]
    fn test_adjust_interval_stays_in_bounds() {
        let mut config = Config::default();
        config.adjust_interval(-30);
        assert_eq!(config.refresh_interval_secs, MIN_REFRESH_INTERVAL_SECS);

        config.adjust_interval(10_000);
        assert_eq!(config.refresh_interval_secs, MAX_REFRESH_INTERVAL_SECS);
    }

    #[test]
    fn test_save_honors_override_path() {
        let path = std::env::temp_dir()
            .join(format!("tornwatch-config-test-{}", std::process::id()))
            .join(CONFIG_FILE);
        let mut config = Config::scratch(path.clone());
        config.refresh_interval_secs = 42;
        config.save().unwrap();

        let reloaded: Config =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded.refresh_interval_secs, 42);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_config_gets_defaults() {
        let config: Config = serde_json::from_str(r#"{"refresh_interval_secs": 30}"#).unwrap();
        assert_eq!(config.refresh_interval_secs, 30);
        assert!(config.pinned.is_empty());
    }
}
