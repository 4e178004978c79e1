//! Expiry alert.
//!
//! [`AlertSignal`] is the only thing the engine knows about sound. Any
//! implementation must swallow its own failures: an alert that cannot be
//! heard must never stop the timer from reaching `Expired`.

mod speaker;
mod tone;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

pub use tone::{Tone, ToneSpec};

/// Capability invoked once per expiry.
pub trait AlertSignal: Send {
    /// Fire the alert. Must return promptly and must not panic.
    fn emit(&self);
}

impl<T: AlertSignal + ?Sized> AlertSignal for Box<T> {
    fn emit(&self) {
        (**self).emit()
    }
}

impl<T: AlertSignal + Sync + ?Sized> AlertSignal for Arc<T> {
    fn emit(&self) {
        (**self).emit()
    }
}

/// Reasons a tone could not be played. Only ever logged.
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("no audio output available: {0}")]
    NoOutput(String),

    #[error("playback failed: {0}")]
    Playback(String),

    #[error("failed to spawn playback thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("built without audio support")]
    Unsupported,
}

/// Alert that does nothing. Used when sound is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAlert;

impl AlertSignal for SilentAlert {
    fn emit(&self) {
        debug!("alert suppressed");
    }
}

/// Plays a synthesized [`Tone`] on the default output device.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToneAlert {
    spec: ToneSpec,
}

impl ToneAlert {
    pub fn new(spec: ToneSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &ToneSpec {
        &self.spec
    }
}

impl AlertSignal for ToneAlert {
    fn emit(&self) {
        if let Err(e) = speaker::play(Tone::new(self.spec)) {
            warn!("alert tone not played: {e}");
        }
    }
}
