//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{IceboxError, IceboxResult};
use console::style;

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    config: &Config,
    manager: &ConfigManager,
) -> IceboxResult<()> {
    match args.action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => show(config),
        ConfigAction::Path => {
            println!("{}", manager.path().display());
            Ok(())
        }
        ConfigAction::Init { force } => init(manager, force).await,
    }
}

fn show(config: &Config) -> IceboxResult<()> {
    let content = toml::to_string_pretty(config)?;
    print!("{}", content);
    Ok(())
}

async fn init(manager: &ConfigManager, force: bool) -> IceboxResult<()> {
    if manager.path().exists() && !force {
        return Err(IceboxError::User(format!(
            "Configuration already exists at {} (use --force to overwrite)",
            manager.path().display()
        )));
    }

    manager.save(&Config::default()).await?;
    println!(
        "{} wrote default configuration to {}",
        style("✓").green(),
        manager.path().display()
    );
    Ok(())
}
