use anyhow::{Context, Result};
use clap::Parser;
use psyfinder::adapters::{adapt_batch, detect};
use psyfinder::filter::{filter_psy_events, matched_keywords};
use psyfinder::sources::{file::raw_records, prepare_collection};
use std::fs;
use std::path::PathBuf;

/// Adapt a JSON event file the way the `file` source would and report which
/// records survive.
#[derive(Parser, Debug)]
#[command(name = "check-dataset", version, about = "Check an event dataset file")]
struct Cli {
    /// Array of records, or an envelope with an `events` array
    path: PathBuf,

    /// Also apply the Psy keyword screen
    #[arg(long)]
    psy_only: bool,

    /// Print every accepted record
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let content = fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    let document: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON in {}", args.path.display()))?;
    let raws = raw_records(document)
        .context("expected an array of events or an object with an `events` array")?;

    println!("📄 {}: {} raw records", args.path.display(), raws.len());
    if let Some(first) = raws.first() {
        println!("   Shape of first record: {}", detect(first));
    }

    let batch = adapt_batch(&raws);
    for (index, reason) in &batch.rejected {
        println!("   ❌ record {index}: {reason}");
    }

    let accepted = batch.records.len();
    let mut events = prepare_collection(batch.records, None);
    let duplicates = accepted - events.len();
    if args.psy_only {
        events = filter_psy_events(&events);
    }

    if args.verbose {
        for event in &events {
            let haystack = format!(
                "{} {} {} {}",
                event.title(),
                event.description(),
                event.genre(),
                event.place()
            );
            println!(
                "   ✅ {} {} [{}]",
                event.date(),
                event.title(),
                matched_keywords(&haystack).join(", ")
            );
        }
    }

    println!("\n📊 Results:");
    println!("   Accepted: {accepted}");
    println!("   Rejected: {}", batch.rejected.len());
    println!("   Duplicates dropped: {duplicates}");
    if args.psy_only {
        println!("   Passing Psy screen: {}", events.len());
    }

    if !batch.rejected.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
