//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default duration for a fresh countdown
//! - Preset durations
//! - Warning threshold for the clock
//! - Expiry tone parameters
//!
//! Configuration is stored at `~/.config/countdown/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::alert::ToneSpec;
use crate::error::{ConfigError, TimerError};
use crate::timer::{
    Preset, TimerConfiguration, DEFAULT_PRESET_MINUTES, DEFAULT_WARNING_THRESHOLD_SECS,
};

/// Timer defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    #[serde(default)]
    pub default_seconds: u32,
    /// Preset durations in whole minutes.
    #[serde(default = "default_presets")]
    pub presets: Vec<u32>,
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold_secs: u64,
}

/// Expiry alert configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_frequency")]
    pub frequency_hz: f64,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default = "default_start_gain")]
    pub start_gain: f64,
    #[serde(default = "default_end_gain")]
    pub end_gain: f64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/countdown/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub alert: AlertConfig,
}

// Default functions
fn default_minutes() -> u32 {
    10
}
fn default_presets() -> Vec<u32> {
    DEFAULT_PRESET_MINUTES.to_vec()
}
fn default_warning_threshold() -> u64 {
    DEFAULT_WARNING_THRESHOLD_SECS
}
fn default_true() -> bool {
    true
}
fn default_frequency() -> f64 {
    800.0
}
fn default_duration_ms() -> u64 {
    1000
}
fn default_start_gain() -> f64 {
    0.3
}
fn default_end_gain() -> f64 {
    0.01
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            default_seconds: 0,
            presets: default_presets(),
            warning_threshold_secs: default_warning_threshold(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency_hz: default_frequency(),
            duration_ms: default_duration_ms(),
            start_gain: default_start_gain(),
            end_gain: default_end_gain(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// holds invalid values, or if the default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// [`load`](Self::load) against an explicit path.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// [`save`](Self::save) against an explicit path.
    ///
    /// # Errors
    ///
    /// See [`save`](Self::save).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Change a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the resulting config is
    /// invalid. `self` is untouched on error.
    pub fn update(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// See [`update`](Self::update) and [`save`](Self::save).
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.update(key, value)?;
        self.save()
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| {
            Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: message.to_string(),
            })
        };

        if self.default_configuration().is_err() {
            return invalid(
                "timer.default_seconds",
                "default duration must be positive with seconds at most 59",
            );
        }
        if self.timer.presets.is_empty() {
            return invalid("timer.presets", "at least one preset is required");
        }
        if self.timer.presets.contains(&0) {
            return invalid("timer.presets", "presets must be at least one minute");
        }
        let alert = &self.alert;
        // Rendered as f32 samples.
        if !(alert.frequency_hz > 0.0 && alert.frequency_hz <= f64::from(f32::MAX)) {
            return invalid("alert.frequency_hz", "must be a positive number within f32 range");
        }
        if alert.duration_ms == 0 {
            return invalid("alert.duration_ms", "must be positive");
        }
        for (key, gain) in [
            ("alert.start_gain", alert.start_gain),
            ("alert.end_gain", alert.end_gain),
        ] {
            if !(gain > 0.0 && gain <= 1.0) {
                return invalid(key, "must be in (0, 1]");
            }
        }
        Ok(())
    }

    /// Duration a fresh countdown starts from when none is given.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidDuration`] if the stored default is invalid.
    pub fn default_configuration(&self) -> Result<TimerConfiguration, TimerError> {
        TimerConfiguration::new(self.timer.default_minutes, self.timer.default_seconds)
    }

    pub fn presets(&self) -> Vec<Preset> {
        self.timer.presets.iter().copied().map(Preset::new).collect()
    }

    pub fn tone_spec(&self) -> ToneSpec {
        ToneSpec {
            frequency_hz: self.alert.frequency_hz as f32,
            duration_ms: self.alert.duration_ms,
            start_gain: self.alert.start_gain as f32,
            end_gain: self.alert.end_gain as f32,
            ..ToneSpec::default()
        }
    }
}
