//! Verify command - recompute content hashes across a built store

use crate::cli::args::VerifyArgs;
use crate::config::Config;
use crate::error::IceboxResult;
use crate::store::StoreReader;
use console::style;

/// Execute the verify command
pub async fn execute(args: VerifyArgs, config: &Config) -> IceboxResult<()> {
    let root = args.root.unwrap_or_else(|| config.store.root.clone());

    let reader = StoreReader::open(&root)?;
    let verified = reader.verify_all()?;

    println!(
        "{} verified {} artifact(s) in {}",
        style("✓").green(),
        verified,
        root.display()
    );

    Ok(())
}
