//! # Countdown Core Library
//!
//! This library provides the core logic for a single countdown timer.
//! All operations are reachable from the standalone `countdown` CLI; any
//! richer front end is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven state machine. Each tick carries the
//!   schedule handle it was issued under, so ticks outliving a pause are
//!   discarded instead of decrementing.
//! - **Alert**: A capability invoked once on expiry that synthesizes a short
//!   decaying sine tone.
//! - **Service**: A tokio task that owns the engine, drives the 1-second tick
//!   and serializes every action through one command queue.
//! - **Storage**: TOML-based configuration for presets and the alert tone.
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerService`] / [`TimerHandle`]: Host scheduler and its client
//! - [`AlertSignal`]: Expiry alert capability
//! - [`Config`]: Application configuration management

pub mod alert;
pub mod error;
pub mod events;
pub mod service;
pub mod storage;
pub mod timer;

pub use alert::{AlertSignal, SilentAlert, Tone, ToneAlert, ToneSpec};
pub use error::{ConfigError, CoreError, TimerError};
pub use events::Event;
pub use service::{TimerHandle, TimerService};
pub use storage::Config;
pub use timer::{
    format_clock, Preset, ScheduleHandle, TimerConfiguration, TimerEngine, TimerPhase,
    TimerSnapshot, TimerState, Urgency,
};
