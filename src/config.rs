//! Persisted user settings (lives in the OS config directory).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{Granularity, LayoutConfig, ScaleConfig, TimelineGeometry, ViewMode};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scale: ScaleConfig,
    pub layout: LayoutConfig,
    pub geometry: TimelineGeometry,
    pub default_granularity: Granularity,
    pub default_view: ViewMode,
    /// Board to open. Without one the app starts on a sample board.
    pub data_file: Option<PathBuf>,
    /// How long toasts stay on screen.
    pub toast_seconds: f32,
    pub open_after_export: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scale: ScaleConfig::default(),
            layout: LayoutConfig::default(),
            geometry: TimelineGeometry::default(),
            default_granularity: Granularity::Week,
            default_view: ViewMode::Project,
            data_file: None,
            toast_seconds: 4.0,
            open_after_export: false,
        }
    }
}

impl AppConfig {
    /// `<config dir>/settings.json`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        directories::ProjectDirs::from("", "", "DispatchTimeline")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Read settings from `path`. A missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load from the default location, falling back to defaults (with a
    /// warning) on any error.
    pub fn load_or_default() -> Self {
        let loaded = Self::default_path().and_then(|path| Self::load_from(&path));
        match loaded {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "using default settings");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn toast_lifetime(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f32(self.toast_seconds.max(0.5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join(SETTINGS_FILE)).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{"scale": {"week_start": "Sun"}, "default_granularity": "month"}"#).unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.scale.week_start, Weekday::Sun);
        assert_eq!(config.scale.day_unit_width, 40.0);
        assert_eq!(config.default_granularity, Granularity::Month);
        assert_eq!(config.geometry.label_column_width, 180.0);
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let config = AppConfig {
            default_view: ViewMode::Resource,
            open_after_export: true,
            ..AppConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(AppConfig::load_from(&path), Err(ConfigError::Json(_))));
    }
}
