use anyhow::{Context, Result};
use clap::Parser;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::{fs, path::PathBuf};

/// Validate a saved `/events` response against the response envelope schema.
#[derive(Parser, Debug)]
#[command(name = "validate-envelope", version, about = "Validate a response envelope against its JSON Schema")]
struct Cli {
    /// Path to the response JSON file to validate
    path: PathBuf,

    /// Schema file (defaults to schemas/response-envelope.v1.json)
    #[arg(long)]
    schema: Option<PathBuf>,
}

fn load_json(path: &PathBuf) -> Result<Value> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let schema_path = args
        .schema
        .unwrap_or_else(|| PathBuf::from("schemas/response-envelope.v1.json"));

    let schema_json = load_json(&schema_path)?;
    let instance = load_json(&args.path)?;

    // jsonschema 0.17 borrows the schema for as long as the validator lives
    let schema_static: &'static Value = Box::leak(Box::new(schema_json));
    let compiled = JSONSchema::options()
        .compile(schema_static)
        .context("Failed to compile JSON Schema")?;

    if let Err(errors) = compiled.validate(&instance) {
        eprintln!("invalid:");
        for error in errors {
            eprintln!("- {} at {}", error, error.instance_path);
        }
        std::process::exit(1);
    }

    // The schema cannot express this one
    if let (Some(total), Some(events)) = (
        instance.get("total").and_then(Value::as_u64),
        instance.get("events").and_then(Value::as_array),
    ) {
        if total as usize != events.len() {
            eprintln!("invalid:\n- total is {} but events has {} items", total, events.len());
            std::process::exit(1);
        }
    }

    println!("valid");
    Ok(())
}
