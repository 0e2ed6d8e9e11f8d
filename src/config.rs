use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio::types::{DEFAULT_TICK_INTERVAL, PREVIOUS_RESTART_THRESHOLD};
use crate::errors::{PlayerError, Result};
use crate::providers::DEFAULT_PROVIDER_TIMEOUT;

pub const CONFIG_FILE_NAME: &str = "engine.json";
pub const MIN_TICK_INTERVAL_MS: u64 = 10;

pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sonami")
}

pub fn get_config_file_path() -> PathBuf {
    get_config_dir().join(CONFIG_FILE_NAME)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub history_capacity: usize,
    pub provider_timeout_ms: u64,
    /// Progress clock period. Zero disables the clock; ticks then come
    /// only from explicit `tick` calls.
    pub tick_interval_ms: u64,
    pub initial_volume: f32,
    pub clear_queue_on_exhaustion: bool,
    pub previous_restart_threshold_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            history_capacity: crate::history::DEFAULT_HISTORY_CAPACITY,
            provider_timeout_ms: DEFAULT_PROVIDER_TIMEOUT.as_millis() as u64,
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            initial_volume: 1.0,
            clear_queue_on_exhaustion: true,
            previous_restart_threshold_ms: PREVIOUS_RESTART_THRESHOLD.as_millis() as u64,
        }
    }
}

impl PlayerConfig {
    /// Reads `path`. A missing file gives the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!(
                "[PlayerConfig] No config at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: PlayerConfig = serde_json::from_str(&raw).map_err(|e| {
            PlayerError::Config(format!("Invalid config {}: {}", path.display(), e))
        })?;
        log::info!("[PlayerConfig] Loaded {}", path.display());
        Ok(config.sanitized())
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn sanitized(mut self) -> Self {
        self.history_capacity = self.history_capacity.max(1);
        self.initial_volume = if self.initial_volume.is_nan() {
            1.0
        } else {
            self.initial_volume.clamp(0.0, 1.0)
        };
        if self.tick_interval_ms != 0 {
            self.tick_interval_ms = self.tick_interval_ms.max(MIN_TICK_INTERVAL_MS);
        }
        self
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn tick_interval(&self) -> Option<Duration> {
        if self.tick_interval_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.tick_interval_ms))
        }
    }

    pub fn previous_restart_threshold(&self) -> Duration {
        Duration::from_millis(self.previous_restart_threshold_ms)
    }

    /// Manual ticking only. Used by tests that drive time themselves.
    pub fn without_clock(mut self) -> Self {
        self.tick_interval_ms = 0;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sonami-engine-{}-{}", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = PlayerConfig::load_from(&temp_path("missing")).unwrap();
        assert_eq!(config, PlayerConfig::default());
        assert_eq!(config.provider_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_fills_defaults_and_sanitizes() {
        let path = temp_path("partial");
        std::fs::write(&path, r#"{ "initial_volume": 3.5, "history_capacity": 0 }"#).unwrap();

        let config = PlayerConfig::load_from(&path).unwrap();
        assert_eq!(config.initial_volume, 1.0);
        assert_eq!(config.history_capacity, 1);
        assert_eq!(config.tick_interval_ms, 250);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let path = temp_path("bad");
        std::fs::write(&path, "{ not json").unwrap();

        let err = PlayerConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, PlayerError::Config(_)));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_save_round_trip() {
        let path = temp_path("save");
        let config = PlayerConfig {
            tick_interval_ms: 5,
            ..PlayerConfig::default()
        };
        config.save_to(&path).unwrap();

        let loaded = PlayerConfig::load_from(&path).unwrap();
        assert_eq!(loaded.tick_interval_ms, MIN_TICK_INTERVAL_MS);
        assert_eq!(loaded.tick_interval(), Some(Duration::from_millis(10)));
        assert_eq!(PlayerConfig::default().without_clock().tick_interval(), None);
        std::fs::remove_file(&path).ok();
    }
}
