//! Decaying sine tone synthesis.

use std::f32::consts::TAU;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Parameters of the expiry tone.
///
/// The gain ramps exponentially from `start_gain` down to `end_gain` over
/// `duration_ms`, so both gains must be positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneSpec {
    pub frequency_hz: f32,
    pub duration_ms: u64,
    pub start_gain: f32,
    pub end_gain: f32,
    pub sample_rate: u32,
}

impl Default for ToneSpec {
    fn default() -> Self {
        Self {
            frequency_hz: 800.0,
            duration_ms: 1000,
            start_gain: 0.3,
            end_gain: 0.01,
            sample_rate: 44_100,
        }
    }
}

impl ToneSpec {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Number of mono samples the tone renders to.
    pub fn sample_count(&self) -> u64 {
        u64::from(self.sample_rate) * self.duration_ms / 1000
    }

    /// Envelope gain `secs` into the tone, clamped to the tone's length.
    pub fn gain_at(&self, secs: f32) -> f32 {
        let length = self.duration_ms as f32 / 1000.0;
        if length <= 0.0 || self.start_gain <= 0.0 {
            return 0.0;
        }
        let progress = (secs / length).clamp(0.0, 1.0);
        self.start_gain * (self.end_gain / self.start_gain).powf(progress)
    }
}

/// Finite mono sample stream for a [`ToneSpec`].
#[derive(Debug, Clone)]
pub struct Tone {
    spec: ToneSpec,
    index: u64,
    len: u64,
}

impl Tone {
    pub fn new(spec: ToneSpec) -> Self {
        Self {
            spec,
            index: 0,
            len: spec.sample_count(),
        }
    }

    pub fn spec(&self) -> &ToneSpec {
        &self.spec
    }
}

impl Iterator for Tone {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.index >= self.len {
            return None;
        }
        let t = self.index as f32 / self.spec.sample_rate as f32;
        self.index += 1;
        Some((TAU * self.spec.frequency_hz * t).sin() * self.spec.gain_at(t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.len - self.index) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Tone {}

#[cfg(feature = "audio")]
impl rodio::Source for Tone {
    fn current_frame_len(&self) -> Option<usize> {
        Some((self.len - self.index) as usize)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.spec.duration())
    }
}
