//! Timer engine implementation.
//!
//! The engine is a tick-driven state machine. It owns no thread or timer of
//! its own: whoever hosts it (see [`crate::service::TimerService`]) must
//! deliver one `tick()` per second while [`TimerEngine::active_schedule`] is
//! `Some`, passing back the handle it was given.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Configured <-> Running -> Expired -> Configured
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(SilentAlert);
//! engine.configure(0, 3)?;
//! engine.start()?;
//! let handle = engine.active_schedule().unwrap();
//! // Once per second:
//! engine.tick(handle); // Returns Some(Event::TimerExpired) on the last tick
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::clock::{format_clock, progress_fraction, Urgency, DEFAULT_WARNING_THRESHOLD_SECS};
use super::duration::{Preset, TimerConfiguration};
use crate::alert::AlertSignal;
use crate::error::TimerError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    /// Nothing configured yet.
    Idle,
    /// Duration set, not counting down. Remaining may be partial after a pause.
    Configured,
    Running,
    /// Reached zero; waiting for reset or a new duration.
    Expired,
}

/// Live countdown values.
///
/// Only the engine writes these. `remaining_seconds <= total_seconds` holds at
/// all times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerState {
    total_seconds: u64,
    remaining_seconds: u64,
    is_running: bool,
}

impl TimerState {
    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }
}

/// Identifies one run of the recurring tick.
///
/// A fresh handle is minted every time the timer goes from stopped to
/// running; a tick carrying any other handle is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleHandle(u64);

impl ScheduleHandle {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Point-in-time view handed to presentation code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub is_running: bool,
    pub progress_fraction: f64,
    pub formatted_clock: String,
    pub phase: TimerPhase,
    pub urgency: Urgency,
}

impl TimerSnapshot {
    /// Progress rounded to a whole percentage.
    pub fn progress_percent(&self) -> u32 {
        (self.progress_fraction * 100.0).round() as u32
    }
}

/// Core countdown engine.
pub struct TimerEngine<A> {
    state: TimerState,
    alert: A,
    active_schedule: Option<ScheduleHandle>,
    next_generation: u64,
    warning_threshold_secs: u64,
}

impl<A: AlertSignal> TimerEngine<A> {
    /// Create an idle engine that will call `alert` on expiry.
    pub fn new(alert: A) -> Self {
        Self {
            state: TimerState::default(),
            alert,
            active_schedule: None,
            next_generation: 0,
            warning_threshold_secs: DEFAULT_WARNING_THRESHOLD_SECS,
        }
    }

    /// Remaining time at or below which snapshots report [`Urgency::Warning`].
    pub fn with_warning_threshold(mut self, secs: u64) -> Self {
        self.warning_threshold_secs = secs;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn phase(&self) -> TimerPhase {
        let s = &self.state;
        if s.is_running {
            TimerPhase::Running
        } else if s.total_seconds == 0 {
            TimerPhase::Idle
        } else if s.remaining_seconds == 0 {
            TimerPhase::Expired
        } else {
            TimerPhase::Configured
        }
    }

    /// The handle ticks must carry, or `None` when no tick should be scheduled.
    pub fn active_schedule(&self) -> Option<ScheduleHandle> {
        self.active_schedule
    }

    pub fn alert(&self) -> &A {
        &self.alert
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let s = &self.state;
        TimerSnapshot {
            total_seconds: s.total_seconds,
            remaining_seconds: s.remaining_seconds,
            is_running: s.is_running,
            progress_fraction: progress_fraction(s.total_seconds, s.remaining_seconds),
            formatted_clock: format_clock(s.remaining_seconds),
            phase: self.phase(),
            urgency: Urgency::classify(
                s.total_seconds,
                s.remaining_seconds,
                self.warning_threshold_secs,
            ),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Commit a new duration; both total and remaining take its value.
    ///
    /// # Errors
    ///
    /// [`TimerError::Running`] while counting down, [`TimerError::InvalidDuration`]
    /// for a zero total or a seconds part above 59. State is untouched on error.
    pub fn configure(&mut self, minutes: u32, seconds: u32) -> Result<Event, TimerError> {
        if self.state.is_running {
            return Err(TimerError::Running);
        }
        let config = TimerConfiguration::new(minutes, seconds)?;
        Ok(self.commit(config))
    }

    /// Same as [`configure`](Self::configure) with `preset.minutes` and zero seconds.
    ///
    /// # Errors
    ///
    /// See [`configure`](Self::configure).
    pub fn apply_preset(&mut self, preset: Preset) -> Result<Event, TimerError> {
        self.configure(preset.minutes, 0)
    }

    /// Begin or resume counting down.
    ///
    /// Returns `Ok(None)` when already running; the active schedule is kept.
    ///
    /// # Errors
    ///
    /// [`TimerError::NotReady`] when there is no remaining time.
    pub fn start(&mut self) -> Result<Option<Event>, TimerError> {
        if self.state.is_running {
            return Ok(None);
        }
        if self.state.remaining_seconds == 0 {
            return Err(TimerError::NotReady);
        }
        self.state.is_running = true;
        let handle = ScheduleHandle(self.next_generation);
        self.next_generation += 1;
        self.active_schedule = Some(handle);
        debug!(
            generation = handle.0,
            remaining = self.state.remaining_seconds,
            "timer started"
        );
        Ok(Some(Event::TimerStarted {
            remaining_seconds: self.state.remaining_seconds,
            at: Utc::now(),
        }))
    }

    /// Stop counting down, keeping the remaining time. No-op unless running.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        self.halt();
        debug!(remaining = self.state.remaining_seconds, "timer paused");
        Some(Event::TimerPaused {
            remaining_seconds: self.state.remaining_seconds,
            at: Utc::now(),
        })
    }

    /// Stop and rewind to the committed duration. Never fires the alert.
    ///
    /// # Errors
    ///
    /// [`TimerError::NotConfigured`] when no duration has been committed.
    pub fn reset(&mut self) -> Result<Event, TimerError> {
        if self.state.total_seconds == 0 {
            return Err(TimerError::NotConfigured);
        }
        self.halt();
        self.state.remaining_seconds = self.state.total_seconds;
        debug!(total = self.state.total_seconds, "timer reset");
        Ok(Event::TimerReset {
            total_seconds: self.state.total_seconds,
            at: Utc::now(),
        })
    }

    /// Advance by one second.
    ///
    /// Ticks whose handle is not the active schedule are discarded. The tick
    /// that reaches zero stops the timer, cancels the schedule and emits the
    /// alert, then returns `Some(Event::TimerExpired)`.
    pub fn tick(&mut self, handle: ScheduleHandle) -> Option<Event> {
        if self.active_schedule != Some(handle) {
            debug!(generation = handle.0, "discarding stale tick");
            return None;
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        if self.state.remaining_seconds > 0 {
            return Some(Event::TimerTicked {
                remaining_seconds: self.state.remaining_seconds,
                at: Utc::now(),
            });
        }

        self.halt();
        info!(total = self.state.total_seconds, "timer expired");
        self.alert.emit();
        Some(Event::TimerExpired {
            total_seconds: self.state.total_seconds,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn commit(&mut self, config: TimerConfiguration) -> Event {
        let total = config.total_seconds();
        self.state.total_seconds = total;
        self.state.remaining_seconds = total;
        debug!(total, "timer configured");
        Event::TimerConfigured {
            total_seconds: total,
            at: Utc::now(),
        }
    }

    fn halt(&mut self) {
        self.state.is_running = false;
        self.active_schedule = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingAlert(AtomicUsize);

    impl AlertSignal for CountingAlert {
        fn emit(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn engine() -> TimerEngine<Arc<CountingAlert>> {
        TimerEngine::new(Arc::new(CountingAlert::default()))
    }

    fn emitted(engine: &TimerEngine<Arc<CountingAlert>>) -> usize {
        engine.alert().0.load(Ordering::SeqCst)
    }

    #[test]
    fn new_engine_is_idle() {
        let engine = engine();
        assert_eq!(engine.phase(), TimerPhase::Idle);
        assert_eq!(engine.state(), TimerState::default());
        assert!(engine.active_schedule().is_none());
    }

    #[test]
    fn configure_sets_total_and_remaining() {
        let mut engine = engine();
        engine.configure(2, 30).unwrap();
        let state = engine.state();
        assert_eq!(state.total_seconds(), 150);
        assert_eq!(state.remaining_seconds(), 150);
        assert!(!state.is_running());
        assert_eq!(engine.phase(), TimerPhase::Configured);
    }

    #[test]
    fn configure_after_pause_rewinds_both_fields() {
        let mut engine = engine();
        engine.configure(0, 10).unwrap();
        engine.start().unwrap();
        let handle = engine.active_schedule().unwrap();
        engine.tick(handle);
        engine.pause();
        assert_eq!(engine.state().remaining_seconds(), 9);

        engine.configure(1, 5).unwrap();
        let state = engine.state();
        assert_eq!(state.total_seconds(), 65);
        assert_eq!(state.remaining_seconds(), 65);
        assert!(!state.is_running());
        assert_eq!(engine.snapshot().progress_fraction, 0.0);
    }

    #[test]
    fn configure_rejected_while_running() {
        let mut engine = engine();
        engine.configure(1, 0).unwrap();
        engine.start().unwrap();
        assert_eq!(engine.configure(5, 0), Err(TimerError::Running));
        assert_eq!(engine.state().total_seconds(), 60);
        assert!(engine.state().is_running());
    }

    #[test]
    fn start_without_time_is_not_ready() {
        let mut engine = engine();
        assert_eq!(engine.start(), Err(TimerError::NotReady));
        assert_eq!(engine.state(), TimerState::default());
        assert!(engine.active_schedule().is_none());
    }

    #[test]
    fn start_then_pause_keeps_remaining() {
        let mut engine = engine();
        engine.configure(0, 10).unwrap();
        assert!(engine.start().unwrap().is_some());
        assert!(engine.pause().is_some());
        assert_eq!(engine.state().remaining_seconds(), 10);
        assert_eq!(engine.phase(), TimerPhase::Configured);
        assert!(engine.active_schedule().is_none());
    }

    #[test]
    fn start_is_idempotent() {
        let mut engine = engine();
        engine.configure(0, 10).unwrap();
        engine.start().unwrap();
        let handle = engine.active_schedule();
        assert_eq!(engine.start(), Ok(None));
        assert_eq!(engine.active_schedule(), handle);
    }

    #[test]
    fn three_ticks_expire_with_one_alert() {
        let mut engine = engine();
        engine.configure(0, 3).unwrap();
        engine.start().unwrap();
        let handle = engine.active_schedule().unwrap();

        assert!(matches!(engine.tick(handle), Some(Event::TimerTicked { remaining_seconds: 2, .. })));
        assert!(matches!(engine.tick(handle), Some(Event::TimerTicked { remaining_seconds: 1, .. })));
        assert!(matches!(engine.tick(handle), Some(Event::TimerExpired { total_seconds: 3, .. })));

        assert_eq!(engine.state().remaining_seconds(), 0);
        assert!(!engine.state().is_running());
        assert_eq!(engine.phase(), TimerPhase::Expired);
        assert_eq!(emitted(&engine), 1);

        // A late tick after expiry is stale and cannot fire again.
        assert!(engine.tick(handle).is_none());
        assert_eq!(emitted(&engine), 1);
        assert_eq!(engine.start(), Err(TimerError::NotReady));
    }

    #[test]
    fn stale_tick_after_resume_is_discarded() {
        let mut engine = engine();
        engine.configure(0, 10).unwrap();
        engine.start().unwrap();
        let first = engine.active_schedule().unwrap();
        engine.pause();
        engine.start().unwrap();
        let second = engine.active_schedule().unwrap();
        assert_ne!(first, second);

        assert!(engine.tick(first).is_none());
        assert_eq!(engine.state().remaining_seconds(), 10);
        engine.tick(second);
        assert_eq!(engine.state().remaining_seconds(), 9);
    }

    #[test]
    fn reset_after_partial_countdown() {
        let mut engine = engine();
        engine.configure(0, 5).unwrap();
        engine.start().unwrap();
        let handle = engine.active_schedule().unwrap();
        engine.tick(handle);
        engine.tick(handle);
        engine.pause();

        assert!(matches!(engine.reset(), Ok(Event::TimerReset { total_seconds: 5, .. })));
        assert_eq!(engine.state().remaining_seconds(), 5);
        assert_eq!(emitted(&engine), 0);
    }

    #[test]
    fn reset_while_running_cancels_schedule() {
        let mut engine = engine();
        engine.configure(0, 5).unwrap();
        engine.start().unwrap();
        let handle = engine.active_schedule().unwrap();
        engine.tick(handle);
        engine.reset().unwrap();

        assert!(!engine.state().is_running());
        assert!(engine.active_schedule().is_none());
        assert!(engine.tick(handle).is_none());
        assert_eq!(engine.state().remaining_seconds(), 5);
    }

    #[test]
    fn reset_before_configure_fails() {
        let mut engine = engine();
        assert_eq!(engine.reset(), Err(TimerError::NotConfigured));
    }

    #[test]
    fn reset_after_expiry_allows_restart() {
        let mut engine = engine();
        engine.configure(0, 1).unwrap();
        engine.start().unwrap();
        let handle = engine.active_schedule().unwrap();
        engine.tick(handle);
        assert_eq!(engine.phase(), TimerPhase::Expired);

        engine.reset().unwrap();
        assert_eq!(engine.phase(), TimerPhase::Configured);
        assert!(engine.start().unwrap().is_some());
        assert_eq!(emitted(&engine), 1);
    }

    #[test]
    fn preset_matches_configure() {
        let mut engine = engine();
        engine.apply_preset(Preset::new(15)).unwrap();
        assert_eq!(engine.state().total_seconds(), 900);
        assert_eq!(engine.state().remaining_seconds(), 900);
    }

    #[test]
    fn snapshot_projections() {
        let mut engine = engine().with_warning_threshold(30);
        let idle = engine.snapshot();
        assert_eq!(idle.progress_fraction, 0.0);
        assert_eq!(idle.formatted_clock, "00:00");
        assert_eq!(idle.phase, TimerPhase::Idle);
        assert_eq!(idle.urgency, Urgency::Normal);

        engine.configure(0, 40).unwrap();
        engine.start().unwrap();
        let handle = engine.active_schedule().unwrap();
        for _ in 0..10 {
            engine.tick(handle);
        }
        let snap = engine.snapshot();
        assert_eq!(snap.remaining_seconds, 30);
        assert_eq!(snap.formatted_clock, "00:30");
        assert_eq!(snap.progress_percent(), 25);
        assert_eq!(snap.urgency, Urgency::Warning);
        assert!(snap.is_running);
    }

    proptest! {
        #[test]
        fn configure_fills_total_and_remaining(minutes in 0u32..10_000, seconds in 0u32..60) {
            prop_assume!(minutes * 60 + seconds > 0);
            let mut engine = engine();
            engine.configure(minutes, seconds).unwrap();
            let expected = u64::from(minutes) * 60 + u64::from(seconds);
            prop_assert_eq!(engine.state().total_seconds(), expected);
            prop_assert_eq!(engine.state().remaining_seconds(), expected);
            prop_assert!(!engine.state().is_running());
            prop_assert!(engine.active_schedule().is_none());
        }

        #[test]
        fn invalid_configure_leaves_state_alone(minutes in 0u32..100, seconds in 60u32..1_000) {
            let mut engine = engine();
            engine.configure(0, 30).unwrap();
            let before = engine.state();
            prop_assert!(engine.configure(minutes, seconds).is_err());
            prop_assert_eq!(engine.state(), before);
        }
    }
}
