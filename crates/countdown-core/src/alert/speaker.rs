//! Hands a rendered tone to the default audio output.
//!
//! Playback runs on its own short-lived thread so the caller never waits for
//! the tone to finish.

use super::tone::Tone;
use super::AlertError;

#[cfg(feature = "audio")]
pub(super) fn play(tone: Tone) -> Result<(), AlertError> {
    std::thread::Builder::new()
        .name("countdown-alert".into())
        .spawn(move || {
            if let Err(e) = play_blocking(tone) {
                tracing::warn!("alert playback failed: {e}");
            }
        })
        .map_err(AlertError::Spawn)?;
    Ok(())
}

#[cfg(feature = "audio")]
fn play_blocking(tone: Tone) -> Result<(), AlertError> {
    use rodio::{OutputStream, Sink};

    // The stream must stay alive until the sink drains.
    let (_stream, handle) =
        OutputStream::try_default().map_err(|e| AlertError::NoOutput(e.to_string()))?;
    let sink = Sink::try_new(&handle).map_err(|e| AlertError::Playback(e.to_string()))?;
    sink.append(tone);
    sink.sleep_until_end();
    Ok(())
}

#[cfg(not(feature = "audio"))]
pub(super) fn play(tone: Tone) -> Result<(), AlertError> {
    tracing::debug!(
        frequency_hz = tone.spec().frequency_hz,
        samples = tone.len(),
        "dropping rendered tone"
    );
    Err(AlertError::Unsupported)
}
