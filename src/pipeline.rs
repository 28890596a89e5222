//! Batch scoring pipeline.
//!
//! Splits the input into fixed-size batches and scores them on the
//! blocking thread pool, with a semaphore bounding how many batches run at
//! once. Batches are joined in submission order, so output order always
//! matches input order.

use crate::config::PipelineConfig;
use crate::features::AmountPolicy;
use crate::metrics::PipelineMetrics;
use crate::models::scorer::{ScoreError, Scorer};
use crate::types::prediction::Prediction;
use crate::types::row::Row;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Prediction tagged with the position of its input row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRow {
    pub index: usize,
    pub prediction: Prediction,
}

/// Result of a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Scored rows in input order
    pub scored: Vec<ScoredRow>,
    /// Rows left out under the skip policy, in input order
    pub rejected: Vec<ScoreError>,
}

impl PipelineOutput {
    pub fn predictions(&self) -> Vec<Prediction> {
        self.scored.iter().map(|s| s.prediction).collect()
    }
}

/// Bounded-parallel batch scorer
pub struct BatchPipeline {
    scorer: Arc<Scorer>,
    metrics: Arc<PipelineMetrics>,
    workers: usize,
    batch_size: usize,
}

impl BatchPipeline {
    pub fn new(
        scorer: Arc<Scorer>,
        metrics: Arc<PipelineMetrics>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            scorer,
            metrics,
            workers: config.workers.max(1),
            batch_size: config.batch_size.max(1),
        }
    }

    /// Score every row according to the scorer's amount policy.
    ///
    /// Under `fail` the first out-of-domain row aborts the run.
    pub async fn run(&self, rows: Vec<Row>) -> Result<PipelineOutput> {
        let total = rows.len();
        let rows = Arc::new(rows);
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let policy = self.scorer.policy();

        info!(
            rows = total,
            batch_size = self.batch_size,
            workers = self.workers,
            policy = ?policy,
            "Scoring batch"
        );

        let mut handles = Vec::with_capacity(total.div_ceil(self.batch_size));
        for start in (0..total).step_by(self.batch_size) {
            let end = (start + self.batch_size).min(total);
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .context("Worker pool closed")?;

            let scorer = self.scorer.clone();
            let metrics = self.metrics.clone();
            let rows = rows.clone();

            handles.push(tokio::task::spawn_blocking(move || {
                let started = Instant::now();
                let results = score_range(&scorer, &rows[start..end], start, policy);
                let rejected = results.iter().filter(|(_, r)| r.is_err()).count();
                metrics.record_batch(started.elapsed(), end - start, rejected);
                debug!(start, end, rejected, "Batch scored");
                drop(permit);
                results
            }));
        }

        let mut output = PipelineOutput {
            scored: Vec::with_capacity(total),
            rejected: Vec::new(),
        };

        for handle in handles {
            let results = handle.await.context("Scoring task panicked")?;
            for (index, result) in results {
                match result {
                    Ok(prediction) => output.scored.push(ScoredRow { index, prediction }),
                    Err(e) if policy == AmountPolicy::Fail => {
                        return Err(e).context("Batch aborted");
                    }
                    Err(e) => {
                        warn!(row = e.row(), error = %e, "Row skipped");
                        output.rejected.push(e);
                    }
                }
            }
        }

        Ok(output)
    }
}

fn score_range(
    scorer: &Scorer,
    rows: &[Row],
    offset: usize,
    policy: AmountPolicy,
) -> Vec<(usize, Result<Prediction, ScoreError>)> {
    match policy {
        AmountPolicy::Clamp => scorer
            .score(rows)
            .into_iter()
            .enumerate()
            .map(|(i, p)| (offset + i, Ok(p)))
            .collect(),
        AmountPolicy::Skip | AmountPolicy::Fail => rows
            .iter()
            .enumerate()
            .map(|(i, row)| (offset + i, scorer.score_row(offset + i, row)))
            .collect(),
    }
}
