//! List command - show artifacts in a built store

use crate::cli::args::{ListArgs, OutputFormat};
use crate::cli::commands::format_bytes;
use crate::config::Config;
use crate::error::IceboxResult;
use crate::store::Manifest;

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> IceboxResult<()> {
    let root = args.root.unwrap_or_else(|| config.store.root.clone());
    let manifest = Manifest::load(&root)?;

    if manifest.is_empty() {
        println!("Store at {} holds no artifacts.", root.display());
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&manifest),
        OutputFormat::Json => print_json(&manifest)?,
        OutputFormat::Plain => print_plain(&manifest),
    }

    Ok(())
}

fn print_table(manifest: &Manifest) {
    println!(
        "{:<44} {:<24} {:<8} {:>10}",
        "KEY", "FUNCTION", "ENCODING", "SIZE"
    );
    println!("{}", "-".repeat(90));

    for (key, entry) in &manifest.entries {
        println!(
            "{:<44} {:<24} {:<8} {:>10}",
            short_key(key),
            entry.function_identity,
            entry.encoding.to_string(),
            format_bytes(entry.size)
        );
    }

    println!();
    println!("Total: {} artifact(s)", manifest.len());
}

fn print_json(manifest: &Manifest) -> IceboxResult<()> {
    #[derive(serde::Serialize)]
    struct EntryJson<'a> {
        key: &'a str,
        function_identity: &'a str,
        arguments: &'a str,
        encoding: String,
        content_hash: &'a str,
        size: u64,
    }

    let entries: Vec<EntryJson> = manifest
        .entries
        .iter()
        .map(|(key, e)| EntryJson {
            key,
            function_identity: &e.function_identity,
            arguments: &e.arguments,
            encoding: e.encoding.to_string(),
            content_hash: &e.content_hash,
            size: e.size,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn print_plain(manifest: &Manifest) {
    for key in manifest.entries.keys() {
        println!("{}", key);
    }
}

/// Shorten a key for table display: prefix + a digest stub
///
/// Truncates on character boundaries; derived keys are ASCII, but manifest
/// keys are not guaranteed to be.
fn short_key(key: &str) -> String {
    let mut chars = key.char_indices();
    // Keys longer than 43 chars show the first 42 plus an ellipsis
    match chars.nth(42) {
        Some((byte_pos, _)) if chars.next().is_some() => format!("{}…", &key[..byte_pos]),
        _ => key.to_string(),
    }
}
