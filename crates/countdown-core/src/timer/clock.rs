//! Read-only projections of the remaining time for display.

use serde::{Deserialize, Serialize};

/// Remaining time at or below which the clock is shown as a warning.
pub const DEFAULT_WARNING_THRESHOLD_SECS: u64 = 60;

/// How close the countdown is to expiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Normal,
    Warning,
    Expired,
}

impl Urgency {
    pub fn classify(total_seconds: u64, remaining_seconds: u64, warning_threshold: u64) -> Self {
        if remaining_seconds == 0 && total_seconds > 0 {
            Urgency::Expired
        } else if remaining_seconds > 0 && remaining_seconds <= warning_threshold {
            Urgency::Warning
        } else {
            Urgency::Normal
        }
    }
}

/// Format seconds as `MM:SS`, or `HH:MM:SS` once there is at least one hour.
pub fn format_clock(remaining_seconds: u64) -> String {
    let hours = remaining_seconds / 3600;
    let minutes = (remaining_seconds % 3600) / 60;
    let seconds = remaining_seconds % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Elapsed share of the total, 0.0 when nothing is configured.
pub fn progress_fraction(total_seconds: u64, remaining_seconds: u64) -> f64 {
    if total_seconds == 0 {
        return 0.0;
    }
    total_seconds.saturating_sub(remaining_seconds) as f64 / total_seconds as f64
}
