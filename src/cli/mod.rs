//! Command-line interface
//!
//! The bare `icebox` binary dispatches through [`dispatch`] with an empty
//! [`App`]; dashboard binaries embedding this crate construct an `App`
//! carrying their plugins and producers and reuse the same dispatch, so
//! `build` freezes their declared data. The caller loads the configuration
//! first (it also drives logging setup) and passes it in.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};

use crate::config::{Config, ConfigManager};
use crate::error::IceboxResult;
use crate::plugin::App;

/// Dispatch to the selected command
pub async fn dispatch(
    cli: Cli,
    app: &App,
    config: &Config,
    manager: &ConfigManager,
) -> IceboxResult<()> {
    match cli.command {
        Commands::Build(args) => commands::build(args, config, app).await,
        Commands::List(args) => commands::list(args, config).await,
        Commands::Get(args) => commands::get(args, config).await,
        Commands::Verify(args) => commands::verify(args, config).await,
        Commands::Config(args) => commands::config(args, config, manager).await,
    }
}
