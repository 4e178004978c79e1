mod clock;
mod duration;
mod engine;

pub use clock::{format_clock, progress_fraction, Urgency, DEFAULT_WARNING_THRESHOLD_SECS};
pub use duration::{Preset, TimerConfiguration, DEFAULT_PRESET_MINUTES};
pub use engine::{ScheduleHandle, TimerEngine, TimerPhase, TimerSnapshot, TimerState};
