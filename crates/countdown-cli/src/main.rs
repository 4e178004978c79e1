use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "countdown", version, about = "Countdown timer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count down once in the terminal
    Run(commands::timer::RunArgs),
    /// Drive the timer with typed commands
    Interactive(commands::interactive::InteractiveArgs),
    /// List preset durations
    Presets {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play the expiry alert once
    Beep,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::timer::run(args).await,
        Commands::Interactive(args) => commands::interactive::run(args).await,
        Commands::Presets { json } => commands::presets::run(json),
        Commands::Beep => commands::alert::beep().await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
