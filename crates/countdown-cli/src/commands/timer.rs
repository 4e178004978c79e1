use std::io::Write;

use clap::Args;
use countdown_core::{
    Config, Event, Preset, TimerEngine, TimerHandle, TimerService, TimerSnapshot, Urgency,
};
use tokio::sync::broadcast::error::RecvError;

use super::{alert, CmdResult};

#[derive(Args)]
pub struct RunArgs {
    /// Minutes part of the duration
    #[arg(short, long, conflicts_with = "preset")]
    minutes: Option<u32>,
    /// Seconds part of the duration (0-59)
    #[arg(short, long, conflicts_with = "preset")]
    seconds: Option<u32>,
    /// Use a whole-minute preset instead of minutes/seconds
    #[arg(short, long)]
    preset: Option<u32>,
    /// Do not play the expiry alert
    #[arg(long)]
    silent: bool,
    /// Print every event as a JSON line instead of a live clock
    #[arg(long)]
    json: bool,
}

/// Build and spawn a service from the loaded config.
pub fn spawn_timer(config: &Config, silent: bool) -> TimerHandle {
    let engine = TimerEngine::new(alert::build(config, silent))
        .with_warning_threshold(config.timer.warning_threshold_secs);
    let (handle, _task) = TimerService::spawn(engine);
    handle
}

pub fn print_json(event: &Event) -> CmdResult {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

/// Redraw the single-line clock in place.
fn draw_clock(snapshot: &TimerSnapshot) -> CmdResult {
    let marker = match snapshot.urgency {
        Urgency::Normal => ' ',
        Urgency::Warning => '!',
        Urgency::Expired => '*',
    };
    let mut out = std::io::stdout().lock();
    write!(
        out,
        "\r{marker} {}  {:>3}%   ",
        snapshot.formatted_clock,
        snapshot.progress_percent()
    )?;
    out.flush()?;
    Ok(())
}

pub async fn run(args: RunArgs) -> CmdResult {
    let config = Config::load()?;
    let timer = spawn_timer(&config, args.silent);
    let mut events = timer.subscribe();

    let configured = match (args.preset, args.minutes, args.seconds) {
        (Some(minutes), _, _) => timer.apply_preset(Preset::new(minutes)).await?,
        (None, None, None) => {
            let default = config.default_configuration()?;
            timer.configure(default.minutes(), default.seconds()).await?
        }
        (None, minutes, seconds) => {
            timer
                .configure(minutes.unwrap_or(0), seconds.unwrap_or(0))
                .await?
        }
    };
    tracing::debug!(?configured, "countdown configured");
    timer.start().await?;

    if !args.json {
        draw_clock(&timer.latest())?;
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    if args.json {
                        print_json(&event)?;
                    } else {
                        draw_clock(&timer.latest())?;
                    }
                    if matches!(event, Event::TimerExpired { .. }) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut ctrl_c => {
                if let Some(event) = timer.pause().await? {
                    if args.json {
                        print_json(&event)?;
                    }
                }
                if !args.json {
                    println!();
                    println!("paused with {} left", timer.latest().formatted_clock);
                }
                timer.shutdown().await?;
                return Ok(());
            }
        }
    }

    if !args.json {
        println!();
        println!("time's up");
    }
    alert::linger(&config, args.silent).await;
    timer.shutdown().await?;
    Ok(())
}
