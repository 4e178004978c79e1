use countdown_core::{format_clock, Config};
use serde_json::json;

use super::CmdResult;

pub fn run(as_json: bool) -> CmdResult {
    let config = Config::load()?;
    let presets = config.presets();

    if as_json {
        let list: Vec<_> = presets
            .iter()
            .map(|p| {
                json!({
                    "minutes": p.minutes,
                    "label": p.label(),
                    "total_seconds": u64::from(p.minutes) * 60,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        for preset in presets {
            println!(
                "{:>8}  {}",
                preset.label(),
                format_clock(u64::from(preset.minutes) * 60)
            );
        }
    }
    Ok(())
}
