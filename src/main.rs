//! Fraud Scorer - CLI Entry Point
//!
//! Loads transactions from a CSV file or generates a synthetic sample,
//! scores them and emits a JSON report.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fraud_scorer::{
    config::{AppConfig, LoggingConfig},
    features::AmountPolicy,
    ingest,
    metrics::PipelineMetrics,
    pipeline::BatchPipeline,
    report::ScoringReport,
    sample::SampleGenerator,
    summary::{BatchSummary, ConfidenceDistribution},
    Scorer,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fraud-scorer", about = "Score card transactions for fraud likelihood")]
struct Cli {
    /// Configuration file (defaults to config/config.toml when present)
    #[arg(short, long, env = "FRAUD_SCORER_CONFIG")]
    config: Option<PathBuf>,

    /// Write the JSON report here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Override the configured amount policy
    #[arg(long, global = true, value_parser = parse_policy)]
    policy: Option<AmountPolicy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score rows from a CSV file
    Score {
        /// CSV file with a header row
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Score a synthetic sample
    Sample {
        /// Number of rows to generate
        #[arg(long)]
        rows: Option<usize>,
        /// Seed for a reproducible sample
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn parse_policy(value: &str) -> Result<AmountPolicy, String> {
    match value.to_ascii_lowercase().as_str() {
        "clamp" => Ok(AmountPolicy::Clamp),
        "skip" => Ok(AmountPolicy::Skip),
        "fail" => Ok(AmountPolicy::Fail),
        other => Err(format!("unknown policy '{}', expected clamp, skip or fail", other)),
    }
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    // Logs go to stderr so the report can own stdout
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    if let Some(policy) = cli.policy {
        config.model.amount_policy = policy;
    }

    init_logging(&config.logging)?;
    info!("Starting Fraud Scorer");
    info!(
        bias = config.model.bias,
        weights = config.model.weights.len(),
        policy = ?config.model.amount_policy,
        "Configuration loaded"
    );

    let (source, rows) = match cli.command {
        Command::Score { input } => {
            let path = input.display().to_string();
            let dataset = tokio::task::spawn_blocking(move || ingest::read_csv_file(&input))
                .await
                .context("Ingestion task panicked")?
                .with_context(|| format!("Failed to load {}", path))?;
            (path, dataset.rows)
        }
        Command::Sample { rows, seed } => {
            let count = rows.unwrap_or(config.sample.rows);
            let seed = seed.or(config.sample.seed);
            info!(rows = count, seed = ?seed, "Generating sample data");
            (
                "sample".to_string(),
                SampleGenerator::from_seed(seed).rows(count),
            )
        }
    };

    let scorer = Arc::new(Scorer::new(
        &config.model.model_weights(),
        config.model.amount_policy,
    ));
    let metrics = Arc::new(PipelineMetrics::new());
    let pipeline = BatchPipeline::new(scorer, metrics.clone(), &config.pipeline);

    let output = pipeline.run(rows.clone()).await?;

    let thresholds = &config.detection.risk_levels;
    let predictions = output.predictions();
    metrics.print_summary(
        &BatchSummary::from_predictions(&predictions, thresholds),
        &ConfidenceDistribution::from_predictions(&predictions),
    );

    let report = ScoringReport::new(source, &rows, &output, thresholds);
    if let Some(evaluation) = &report.evaluation {
        let matrix = &evaluation.confusion;
        info!(
            true_positives = matrix.true_positives,
            false_positives = matrix.false_positives,
            true_negatives = matrix.true_negatives,
            false_negatives = matrix.false_negatives,
            accuracy = ?matrix.accuracy(),
            auc = ?evaluation.auc,
            "Evaluated against Class column"
        );
    }
    match &cli.output {
        Some(path) => report.write_to_path(path)?,
        None => report.write_to(std::io::stdout().lock())?,
    }

    Ok(())
}
