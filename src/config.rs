// src/config.rs
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;

/// Thresholds for raised-arm detection and gesture confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Sustained signal (ms) needed to confirm a gesture.
    pub threshold_ms: u64,
    /// Quiet period (ms) after a confirmed gesture.
    pub cooldown_ms: u64,
    /// Fixed decrement applied per tick without signal.
    pub decay_per_tick_ms: u64,
    /// Wrist and shoulder confidence must both exceed this.
    pub confidence_threshold: f64,
    /// How far (px) the wrist must sit above the shoulder.
    pub wrist_offset_px: f64,
    /// Delta used for the first tick after the engine is enabled.
    pub nominal_tick_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            threshold_ms: 1000,
            cooldown_ms: 2000,
            decay_per_tick_ms: 50,
            confidence_threshold: 0.6,
            wrist_offset_px: 60.0,
            nominal_tick_ms: 16,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold_ms == 0 {
            return Err(ConfigError::Invalid("threshold_ms must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "confidence_threshold {} is outside [0, 1]",
                self.confidence_threshold
            )));
        }
        if self.wrist_offset_px < 0.0 || !self.wrist_offset_px.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "wrist_offset_px {} must be a non-negative number",
                self.wrist_offset_px
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gesture: GestureConfig,
    /// Titles of the viewer sections, in navigation order.
    pub sections: Vec<String>,
    pub output_directory: PathBuf,
}

pub fn default_sections() -> Vec<String> {
    ["Profile Summary", "Work Experience", "Education", "Skills & Interests"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            sections: default_sections(),
            output_directory: directories::UserDirs::new()
                .and_then(|dirs| dirs.document_dir().map(|p| p.join("GestureNav")))
                .unwrap_or_else(|| PathBuf::from("./output")),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads `path` when given, otherwise the settings file at
    /// [`Settings::default_path`] if one exists, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_or_fallback(path, &Self::default_path())
    }

    pub fn load_or_fallback(path: Option<&Path>, fallback: &Path) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None if fallback.exists() => {
                debug!("Loading settings from {}", fallback.display());
                Self::load(fallback)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gesture.validate()?;
        if self.sections.is_empty() {
            return Err(ConfigError::Invalid("at least one section is required".into()));
        }
        Ok(())
    }

    /// Default settings file location.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "gesture-nav", "gesture_nav")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("gesture_nav.json"))
    }
}
