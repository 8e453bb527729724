//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;

/// Icebox - Build-time freeze store for portable dashboards
///
/// Freezes every data artifact the dashboard's plugins declare into a
/// content-addressed store, so a portable deployment reads precomputed
/// artifacts instead of re-running producers.
#[derive(Parser, Debug)]
#[command(name = "icebox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ICEBOX_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect plugin registrations and build the freeze store
    Build(BuildArgs),

    /// List artifacts in a built store
    List(ListArgs),

    /// Look up one artifact and print or save its payload
    Get(GetArgs),

    /// Verify content hashes across a built store
    Verify(VerifyArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Storage root to write into (defaults to store.root from config)
    #[arg(short, long)]
    pub root: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Storage root to read (defaults to store.root from config)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Function identity of the producer (e.g. load_table)
    pub function_identity: String,

    /// Argument as NAME=VALUE; VALUE is parsed as JSON, falling back to a
    /// plain string (repeatable)
    #[arg(short, long, value_parser = parse_argument)]
    pub arg: Vec<(String, Value)>,

    /// Full argument mapping as a JSON object
    #[arg(long, conflicts_with = "arg")]
    pub args_json: Option<String>,

    /// Write the payload to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Storage root to read (defaults to store.root from config)
    #[arg(short, long)]
    pub root: Option<PathBuf>,
}

/// Arguments for the verify command
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Storage root to verify (defaults to store.root from config)
    #[arg(short, long)]
    pub root: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one key per line)
    Plain,
}

/// Parse an argument in NAME=VALUE format, with a JSON-typed value
fn parse_argument(s: &str) -> Result<(String, Value), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid NAME=VALUE format: no '=' found in '{s}'"))?;
    let name = s[..pos].to_string();
    let raw = &s[pos + 1..];

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name, value))
}
