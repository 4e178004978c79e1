use std::time::Duration;

use countdown_core::{AlertSignal, Config, SilentAlert, ToneAlert};

use super::CmdResult;

/// Extra time given to the playback thread before the process exits.
const PLAYBACK_GRACE: Duration = Duration::from_millis(150);

/// Pick the alert for this run from config and the `--silent` flag.
pub fn build(config: &Config, silent: bool) -> Box<dyn AlertSignal> {
    if silent || !config.alert.enabled {
        Box::new(SilentAlert)
    } else {
        Box::new(ToneAlert::new(config.tone_spec()))
    }
}

/// Keep the process alive long enough for an emitted tone to finish.
pub async fn linger(config: &Config, silent: bool) {
    if !silent && config.alert.enabled {
        tokio::time::sleep(config.tone_spec().duration() + PLAYBACK_GRACE).await;
    }
}

pub async fn beep() -> CmdResult {
    let config = Config::load()?;
    if !config.alert.enabled {
        println!("alert disabled (alert.enabled = false)");
        return Ok(());
    }
    ToneAlert::new(config.tone_spec()).emit();
    linger(&config, false).await;
    println!("ok");
    Ok(())
}
