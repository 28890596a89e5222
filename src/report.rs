//! JSON report of a scoring run

use crate::evaluation::Evaluation;
use crate::pipeline::PipelineOutput;
use crate::summary::{BatchSummary, ConfidenceDistribution};
use crate::types::prediction::{Label, RiskLevel, RiskLevelThresholds};
use crate::types::row::Row;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// One scored row as presented to the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredTransaction {
    /// 1-based position in the input
    pub row: usize,
    pub amount: f64,
    pub label: Label,
    pub confidence: f64,
    pub raw_score: f64,
    pub risk_level: RiskLevel,
}

/// Row left out of the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRow {
    /// 1-based position in the input
    pub row: usize,
    pub reason: String,
}

/// Everything the presentation layer needs about one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringReport {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
    /// Input file, or "sample" for synthetic data
    pub source: String,
    pub summary: BatchSummary,
    pub distribution: ConfidenceDistribution,
    /// Present when the input carries a `Class` column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
    pub transactions: Vec<ScoredTransaction>,
    pub rejected: Vec<RejectedRow>,
}

impl ScoringReport {
    pub fn new(
        source: String,
        rows: &[Row],
        output: &PipelineOutput,
        thresholds: &RiskLevelThresholds,
    ) -> Self {
        let predictions = output.predictions();

        let transactions = output
            .scored
            .iter()
            .map(|s| ScoredTransaction {
                row: s.index + 1,
                amount: rows
                    .get(s.index)
                    .and_then(|r| r.get("Amount"))
                    .filter(|a| a.is_finite())
                    .unwrap_or_default(),
                label: s.prediction.label,
                confidence: s.prediction.confidence,
                raw_score: s.prediction.raw_score,
                risk_level: s.prediction.risk_level(thresholds),
            })
            .collect();

        let rejected = output
            .rejected
            .iter()
            .map(|e| RejectedRow {
                row: e.row() + 1,
                reason: e.to_string(),
            })
            .collect();

        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            source,
            summary: BatchSummary::from_predictions(&predictions, thresholds),
            distribution: ConfidenceDistribution::from_predictions(&predictions),
            evaluation: Evaluation::from_rows(rows, &output.scored),
            transactions,
            rejected,
        }
    }

    /// Write the report as pretty JSON to a file
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        self.write_to(std::io::BufWriter::new(file))?;

        info!(
            report_id = %self.report_id,
            path = %path.display(),
            transactions = self.transactions.len(),
            "Report written"
        );
        Ok(())
    }

    /// Write the report as pretty JSON
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, self).context("Failed to serialize report")?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
