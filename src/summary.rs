//! Aggregations over a batch of predictions.
//!
//! These are pure functions of the prediction sequence; they feed the
//! report and the log summary but play no part in scoring.

use crate::types::prediction::{Prediction, RiskLevel, RiskLevelThresholds};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lower bounds of the confidence bins; the last bin is closed at 1.0.
pub const CONFIDENCE_BIN_EDGES: [f64; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

/// Number of confidence bins
pub const CONFIDENCE_BINS: usize = CONFIDENCE_BIN_EDGES.len() - 1;

/// Headline counts for a scored batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub fraudulent: usize,
    pub legitimate: usize,
    /// Fraudulent share in percent; 0 for an empty batch
    pub fraud_rate: f64,
    pub risk_levels: BTreeMap<String, usize>,
}

impl BatchSummary {
    pub fn from_predictions(predictions: &[Prediction], thresholds: &RiskLevelThresholds) -> Self {
        let total = predictions.len();
        let fraudulent = predictions.iter().filter(|p| p.label.is_fraud()).count();

        let mut risk_levels: BTreeMap<String, usize> = RiskLevel::ALL
            .iter()
            .map(|level| (level.as_str().to_string(), 0))
            .collect();
        for prediction in predictions {
            let level = prediction.risk_level(thresholds);
            *risk_levels.entry(level.as_str().to_string()).or_insert(0) += 1;
        }

        let fraud_rate = if total > 0 {
            (fraudulent as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        Self {
            total,
            fraudulent,
            legitimate: total - fraudulent,
            fraud_rate,
            risk_levels,
        }
    }
}

/// Histogram of prediction confidence over five fixed bins:
/// `[0,0.2) [0.2,0.4) [0.4,0.6) [0.6,0.8) [0.8,1.0]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceDistribution {
    pub counts: [usize; CONFIDENCE_BINS],
}

impl ConfidenceDistribution {
    pub fn from_predictions(predictions: &[Prediction]) -> Self {
        let mut counts = [0; CONFIDENCE_BINS];
        for prediction in predictions {
            if let Some(bin) = confidence_bin(prediction.confidence) {
                counts[bin] += 1;
            }
        }
        Self { counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(label, count)` per bin, e.g. `("60-80%", 3)`
    pub fn labelled(&self) -> Vec<(String, usize)> {
        CONFIDENCE_BIN_EDGES
            .windows(2)
            .zip(self.counts)
            .map(|(edges, count)| {
                (
                    format!("{:.0}-{:.0}%", edges[0] * 100.0, edges[1] * 100.0),
                    count,
                )
            })
            .collect()
    }
}

/// Bin index for a confidence value, or `None` outside [0, 1].
pub fn confidence_bin(confidence: f64) -> Option<usize> {
    if !(0.0..=1.0).contains(&confidence) {
        return None;
    }
    let last = CONFIDENCE_BINS - 1;
    let bin = CONFIDENCE_BIN_EDGES[1..last + 1]
        .iter()
        .position(|&upper| confidence < upper)
        .unwrap_or(last);
    Some(bin)
}
