//! Line-driven front end exposing every timer action.

use clap::Args;
use countdown_core::{format_clock, Config, CoreError, Event, Preset, TimerHandle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use super::timer::{print_json, spawn_timer};
use super::CmdResult;

const HELP: &str = "\
commands:
  set M [S]   set the duration (minutes, optional seconds 0-59)
  preset M    use a whole-minute preset
  start       start or resume
  pause       pause, keeping the remaining time
  reset       rewind to the set duration
  status      show the clock
  presets     list presets
  help        show this text
  quit        exit";

#[derive(Args)]
pub struct InteractiveArgs {
    /// Do not play the expiry alert
    #[arg(long)]
    silent: bool,
    /// Print events and status as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Set { minutes: u32, seconds: u32 },
    Preset(u32),
    Start,
    Pause,
    Reset,
    Status,
    Presets,
    Help,
    Quit,
}

/// Parse one line. Blank lines yield `Ok(None)`.
fn parse(line: &str) -> Result<Option<Input>, String> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let mut number = |name: &str| -> Result<Option<u32>, String> {
        words
            .next()
            .map(|w| {
                w.parse::<u32>()
                    .map_err(|_| format!("{name} must be a whole number, got '{w}'"))
            })
            .transpose()
    };

    let input = match word.to_ascii_lowercase().as_str() {
        "set" => {
            let minutes = number("minutes")?.ok_or("usage: set M [S]")?;
            let seconds = number("seconds")?.unwrap_or(0);
            Input::Set { minutes, seconds }
        }
        "preset" => Input::Preset(number("preset")?.ok_or("usage: preset M")?),
        "start" | "resume" => Input::Start,
        "pause" => Input::Pause,
        "reset" => Input::Reset,
        "status" => Input::Status,
        "presets" => Input::Presets,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(input))
}

fn describe(event: &Event) -> Option<String> {
    match event {
        Event::TimerConfigured { total_seconds, .. } => {
            Some(format!("set to {}", format_clock(*total_seconds)))
        }
        Event::TimerStarted {
            remaining_seconds, ..
        } => Some(format!("started at {}", format_clock(*remaining_seconds))),
        Event::TimerPaused {
            remaining_seconds, ..
        } => Some(format!("paused at {}", format_clock(*remaining_seconds))),
        Event::TimerReset { total_seconds, .. } => {
            Some(format!("reset to {}", format_clock(*total_seconds)))
        }
        Event::TimerExpired { .. } => Some("time's up".to_string()),
        Event::TimerTicked { .. } => None,
    }
}

/// Apply one input. Returns `false` when the session should end.
async fn apply(
    timer: &TimerHandle,
    config: &Config,
    input: Input,
    json: bool,
) -> Result<bool, CoreError> {
    let outcome = match input {
        Input::Set { minutes, seconds } => timer.configure(minutes, seconds).await.map(drop),
        Input::Preset(minutes) => timer.apply_preset(Preset::new(minutes)).await.map(drop),
        Input::Start => timer.start().await.map(drop),
        Input::Pause => timer.pause().await.map(drop),
        Input::Reset => timer.reset().await.map(drop),
        Input::Status => {
            let snapshot = timer.snapshot().await?;
            if json {
                println!("{}", serde_json::to_string(&snapshot)?);
            } else {
                println!(
                    "{}  {}%  {:?}",
                    snapshot.formatted_clock,
                    snapshot.progress_percent(),
                    snapshot.phase
                );
            }
            Ok(())
        }
        Input::Presets => {
            let labels: Vec<String> = config.presets().iter().map(Preset::label).collect();
            println!("{}", labels.join(", "));
            Ok(())
        }
        Input::Help => {
            println!("{HELP}");
            Ok(())
        }
        Input::Quit => return Ok(false),
    };
    // Rejections are reported and the session goes on.
    if let Err(e) = outcome {
        eprintln!("error: {e}");
    }
    Ok(true)
}

pub async fn run(args: InteractiveArgs) -> CmdResult {
    let config = Config::load()?;
    let timer = spawn_timer(&config, args.silent);
    let mut events = timer.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if !args.json {
        println!("type 'help' for commands");
    }

    loop {
        tokio::select! {
            biased;
            received = events.recv() => match received {
                Ok(event) if event.is_tick() => {}
                Ok(event) => {
                    if args.json {
                        print_json(&event)?;
                    } else if let Some(text) = describe(&event) {
                        println!("{text}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse(&line) {
                    Ok(Some(input)) => {
                        if !apply(&timer, &config, input, args.json).await? {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(message) => eprintln!("error: {message}"),
                }
            }
        }
    }

    // Flush what the last actions published before leaving.
    while let Ok(event) = events.try_recv() {
        if event.is_tick() {
            continue;
        }
        if args.json {
            print_json(&event)?;
        } else if let Some(text) = describe(&event) {
            println!("{text}");
        }
    }
    timer.shutdown().await?;
    Ok(())
}
