//! Build command - freeze every registered artifact into the store

use crate::cli::args::BuildArgs;
use crate::cli::commands::format_bytes;
use crate::config::Config;
use crate::error::IceboxResult;
use crate::plugin::App;
use crate::store::StoreBuilder;
use console::style;
use std::path::PathBuf;
use tracing::debug;

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config, app: &App) -> IceboxResult<()> {
    let root: PathBuf = args.root.unwrap_or_else(|| config.store.root.clone());

    debug!("Collecting registrations from {} plugin(s)", app.plugins().len());
    let ledger = app.collect_registrations()?;

    println!(
        "Collected {} registration(s) from {} plugin(s)",
        ledger.len(),
        app.plugins().len()
    );

    let report = StoreBuilder::new(app.producers()).build(&ledger, &root)?;

    println!(
        "{} froze {} artifact(s), {} into {}",
        style("✓").green(),
        report.artifacts,
        format_bytes(report.total_bytes),
        root.display()
    );
    if report.duplicates_collapsed > 0 {
        println!(
            "  {} duplicate registration(s) collapsed",
            report.duplicates_collapsed
        );
    }

    Ok(())
}
