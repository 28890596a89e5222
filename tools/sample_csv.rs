//! Sample CSV Writer
//!
//! Writes synthetic transactions in the scorer's input format, for trying
//! the `score` command end to end.

use anyhow::{Context, Result};
use clap::Parser;
use fraud_scorer::features::FEATURE_NAMES;
use fraud_scorer::sample::{SampleGenerator, DEFAULT_SAMPLE_ROWS};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "sample-csv", about = "Write synthetic transactions as CSV")]
struct Args {
    /// Number of rows to generate
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_ROWS)]
    rows: usize,

    /// Seed for a reproducible file
    #[arg(long)]
    seed: Option<u64>,

    /// Destination file
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_csv=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let mut generator = SampleGenerator::from_seed(args.seed);

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    writer.write_record(FEATURE_NAMES)?;

    for _ in 0..args.rows {
        let row = generator.row();
        let record: Vec<String> = FEATURE_NAMES
            .iter()
            .map(|&name| row.get(name).unwrap_or_default().to_string())
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(
        rows = args.rows,
        path = %args.output.display(),
        "Sample CSV written"
    );
    Ok(())
}
