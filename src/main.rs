//! Icebox - Build-Time Freeze Store CLI
//!
//! Entry point that dispatches to subcommands. The standalone binary hosts
//! no plugins, which still supports building empty stores and inspecting,
//! querying and verifying existing ones; dashboard binaries embed
//! `icebox::cli::dispatch` with their own `App`.

use clap::Parser;
use console::style;
use icebox::cli::Cli;
use icebox::config::ConfigManager;
use icebox::error::IceboxResult;
use icebox::plugin::App;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> IceboxResult<()> {
    let cli = Cli::parse();

    // Config drives the log format, so it loads before the subscriber
    let manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = manager.load().await?;

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug;
    // general.verbose in the config acts as a floor of one
    let filter = match config.general.effective_verbosity(cli.verbose) {
        0 => EnvFilter::new("icebox=warn"),
        1 => EnvFilter::new("icebox=info"),
        _ => EnvFilter::new("icebox=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time();
    if config.general.json_logs() {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let app = App::new();
    icebox::cli::dispatch(cli, &app, &config, &manager).await
}
