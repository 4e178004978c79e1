use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change of the timer produces an Event.
/// Front ends print or subscribe to them; snapshots carry the full state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerConfigured {
        total_seconds: u64,
        at: DateTime<Utc>,
    },
    TimerStarted {
        remaining_seconds: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_seconds: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        total_seconds: u64,
        at: DateTime<Utc>,
    },
    /// One-second decrement while running.
    TimerTicked {
        remaining_seconds: u64,
        at: DateTime<Utc>,
    },
    /// Remaining time reached zero and the alert was emitted.
    TimerExpired {
        total_seconds: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_tick(&self) -> bool {
        matches!(self, Event::TimerTicked { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::TimerExpired {
            total_seconds: 3,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "timer_expired");
        assert_eq!(json["total_seconds"], 3);
    }
}
