//! Runtime statistics for scoring runs.

use crate::summary::{BatchSummary, ConfidenceDistribution};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for the batch pipeline
pub struct PipelineMetrics {
    /// Rows that produced a prediction
    pub rows_scored: AtomicU64,
    /// Rows rejected by the amount policy
    pub rows_rejected: AtomicU64,
    /// Batches completed
    pub batches: AtomicU64,
    /// Batch processing times (in microseconds)
    batch_times: RwLock<Vec<u64>>,
    start_time: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            rows_scored: AtomicU64::new(0),
            rows_rejected: AtomicU64::new(0),
            batches: AtomicU64::new(0),
            batch_times: RwLock::new(Vec::with_capacity(64)),
            start_time: Instant::now(),
        }
    }

    /// Record a completed batch of `rows` rows, `rejected` of which failed
    pub fn record_batch(&self, elapsed: Duration, rows: usize, rejected: usize) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.rows_scored
            .fetch_add((rows - rejected.min(rows)) as u64, Ordering::Relaxed);
        self.rows_rejected.fetch_add(rejected as u64, Ordering::Relaxed);

        if let Ok(mut times) = self.batch_times.write() {
            times.push(elapsed.as_micros() as u64);
            // Keep only the most recent 10000
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }
    }

    /// Batch latency statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let sorted = match self.batch_times.read() {
            Ok(times) if !times.is_empty() => {
                let mut sorted = times.clone();
                sorted.sort_unstable();
                sorted
            }
            _ => return ProcessingStats::default(),
        };

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let percentile = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Rows per second since the collector was created
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.rows_scored.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Log the run summary
    pub fn print_summary(&self, summary: &BatchSummary, distribution: &ConfidenceDistribution) {
        let scored = self.rows_scored.load(Ordering::Relaxed);
        let rejected = self.rows_rejected.load(Ordering::Relaxed);
        let processing = self.get_processing_stats();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║               FRAUD SCORER - RUN SUMMARY                     ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Rows Scored:    {:>8}  │  Throughput: {:>10.1} rows/s     ║",
            scored,
            self.get_throughput()
        );
        info!(
            "║ Rows Rejected:  {:>8}  │  Batches:    {:>10}            ║",
            rejected, processing.count
        );
        info!(
            "║ Fraudulent:     {:>8}  │  Legitimate: {:>10}            ║",
            summary.fraudulent, summary.legitimate
        );
        info!(
            "║ Fraud Rate:     {:>7.1}%                                     ║",
            summary.fraud_rate
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Batch Time (μs): mean={:>6} p50={:>6} p95={:>6} max={:>6}   ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.max_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Risk Levels:                                                 ║");
        for (level, count) in &summary.risk_levels {
            info!("║   {:10}: {:>8}                                         ║", level, count);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Confidence Distribution:                                     ║");
        let total = distribution.total();
        for (label, count) in distribution.labelled() {
            let pct = if total > 0 {
                (count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            let bar = "█".repeat(((pct / 2.0) as usize).min(20));
            info!("║   {:>8}: {:>6} ({:>5.1}%) {}", label, count, pct, bar);
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Batch processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = PipelineMetrics::new();

        metrics.record_batch(Duration::from_micros(100), 10, 0);
        metrics.record_batch(Duration::from_micros(300), 5, 2);

        assert_eq!(metrics.batches.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.rows_scored.load(Ordering::Relaxed), 13);
        assert_eq!(metrics.rows_rejected.load(Ordering::Relaxed), 2);

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean_us, 200);
        assert_eq!(stats.max_us, 300);
    }

    #[test]
    fn test_empty_stats() {
        let stats = PipelineMetrics::new().get_processing_stats();

        assert_eq!(stats.count, 0);
        assert_eq!(stats.max_us, 0);
    }
}
