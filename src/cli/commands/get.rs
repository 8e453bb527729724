//! Get command - look up one artifact from a built store

use crate::cli::args::GetArgs;
use crate::config::Config;
use crate::error::{IceboxError, IceboxResult};
use crate::store::{ArgMap, Payload, StoreReader};
use console::style;
use serde_json::Value;
use std::fs;
use std::io::{self, Write};

/// Execute the get command
pub async fn execute(args: GetArgs, config: &Config) -> IceboxResult<()> {
    let root = args.root.clone().unwrap_or_else(|| config.store.root.clone());
    let arguments = argument_map(&args)?;

    let mut reader = StoreReader::open(&root)?;
    if !config.store.verify_on_read {
        reader = reader.without_verification();
    }

    let payload = reader.lookup(&args.function_identity, arguments)?;

    match args.output {
        Some(path) => {
            let bytes = payload.encode();
            fs::write(&path, &bytes)
                .map_err(|e| IceboxError::io(format!("writing payload to {}", path.display()), e))?;
            eprintln!(
                "{} wrote {} byte(s) to {}",
                style("✓").green(),
                bytes.len(),
                path.display()
            );
        }
        None => match &payload {
            Payload::Json(value) => println!("{}", serde_json::to_string_pretty(value)?),
            Payload::Bytes(bytes) => {
                io::stdout()
                    .write_all(bytes)
                    .map_err(|e| IceboxError::io("writing payload to stdout", e))?;
            }
        },
    }

    Ok(())
}

/// Assemble the argument mapping from --arg pairs or --args-json
fn argument_map(args: &GetArgs) -> IceboxResult<ArgMap> {
    if let Some(ref raw) = args.args_json {
        let value: Value = serde_json::from_str(raw).map_err(|e| {
            IceboxError::serialization(&args.function_identity, format!("--args-json: {}", e))
        })?;
        return match value {
            Value::Object(map) => Ok(map),
            other => Err(IceboxError::serialization(
                &args.function_identity,
                format!("--args-json must be a JSON object, got: {}", other),
            )),
        };
    }

    let mut map = ArgMap::new();
    for (name, value) in &args.arg {
        map.insert(name.clone(), value.clone());
    }
    Ok(map)
}
