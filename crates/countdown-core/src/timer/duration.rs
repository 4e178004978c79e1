use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// Minute values offered as one-click presets.
pub const DEFAULT_PRESET_MINUTES: [u32; 6] = [5, 10, 15, 20, 30, 60];

/// A validated minutes/seconds pair.
///
/// The seconds part is kept in `0..=59` and the total is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfiguration {
    minutes: u32,
    seconds: u32,
}

impl TimerConfiguration {
    /// Validate a minutes/seconds pair.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidDuration`] if `seconds > 59` or the
    /// total is zero.
    pub fn new(minutes: u32, seconds: u32) -> Result<Self, TimerError> {
        if seconds > 59 || (minutes == 0 && seconds == 0) {
            return Err(TimerError::InvalidDuration { minutes, seconds });
        }
        Ok(Self { minutes, seconds })
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }
}

/// A fixed whole-minute duration shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preset {
    pub minutes: u32,
}

impl Preset {
    pub const fn new(minutes: u32) -> Self {
        Self { minutes }
    }

    /// The built-in 5/10/15/20/30/60 minute presets.
    pub fn defaults() -> Vec<Preset> {
        DEFAULT_PRESET_MINUTES.iter().copied().map(Preset::new).collect()
    }

    pub fn label(&self) -> String {
        format!("{} min", self.minutes)
    }

    /// # Errors
    ///
    /// Returns [`TimerError::InvalidDuration`] for a zero-minute preset.
    pub fn configuration(&self) -> Result<TimerConfiguration, TimerError> {
        TimerConfiguration::new(self.minutes, 0)
    }
}
