//! Linear fraud scorer
//!
//! Each row is extracted against the feature schema, scaled, reduced to a
//! weighted sum and squashed through the logistic function. Rows are scored
//! independently, so batches can be split across threads freely.

use crate::features::{AmountPolicy, FeatureExtractor, AMOUNT_INDEX, FEATURE_NAMES};
use crate::models::weights::{ModelWeights, ResolvedWeights};
use crate::types::prediction::Prediction;
use crate::types::row::Row;
use thiserror::Error;
use tracing::debug;

/// Errors raised while scoring a row
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("row {row}: Amount {amount} is at or below -1, ln(Amount + 1) is undefined")]
    InvalidAmount { row: usize, amount: f64 },
}

impl ScoreError {
    /// Index of the offending row within its batch
    pub fn row(&self) -> usize {
        match self {
            ScoreError::InvalidAmount { row, .. } => *row,
        }
    }
}

/// Scores rows with a fixed linear model.
///
/// The scorer holds no mutable state; share it behind an `Arc` across
/// workers.
#[derive(Debug, Clone)]
pub struct Scorer {
    extractor: FeatureExtractor,
    weights: ResolvedWeights,
    policy: AmountPolicy,
}

impl Scorer {
    /// Create a scorer from a weight table and an amount policy
    pub fn new(weights: &ModelWeights, policy: AmountPolicy) -> Self {
        let resolved = weights.resolve();
        debug!(
            bias = resolved.bias,
            weighted_features = resolved.len(),
            policy = ?policy,
            "Scorer initialized"
        );

        Self {
            extractor: FeatureExtractor::new(),
            weights: resolved,
            policy,
        }
    }

    pub fn policy(&self) -> AmountPolicy {
        self.policy
    }

    pub fn weights(&self) -> &ResolvedWeights {
        &self.weights
    }

    /// Score a batch with negative amounts normalized to zero.
    ///
    /// Never fails; the output has one prediction per row, in input order.
    /// The configured policy is not consulted.
    pub fn score(&self, rows: &[Row]) -> Vec<Prediction> {
        rows.iter()
            .map(|row| Prediction::from_raw_score(self.raw_score_clamped(row)))
            .collect()
    }

    /// Score a single row under the configured policy.
    ///
    /// `index` only labels the error.
    pub fn score_row(&self, index: usize, row: &Row) -> Result<Prediction, ScoreError> {
        self.predict(row, self.policy)
            .ok_or_else(|| ScoreError::InvalidAmount {
                row: index,
                amount: row.get(FEATURE_NAMES[AMOUNT_INDEX]).unwrap_or_default(),
            })
    }

    /// Score a batch, reporting out-of-domain rows individually.
    ///
    /// Results line up with `rows` one to one.
    pub fn score_checked(&self, rows: &[Row]) -> Vec<Result<Prediction, ScoreError>> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| self.score_row(i, row))
            .collect()
    }

    /// Score a batch, stopping at the first out-of-domain row.
    pub fn score_strict(&self, rows: &[Row]) -> Result<Vec<Prediction>, ScoreError> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| self.score_row(i, row))
            .collect()
    }

    /// Bias-adjusted weighted sum for a row, before the sigmoid
    pub fn raw_score(&self, row: &Row, policy: AmountPolicy) -> Option<f64> {
        let features = self.extractor.extract(row);
        let scaled = self.extractor.scale(&features, policy)?;
        Some(self.weights.linear_score(scaled.values()))
    }

    /// Raw score with negative amounts read as zero
    pub fn raw_score_clamped(&self, row: &Row) -> f64 {
        let features = self.extractor.extract(row);
        let scaled = self.extractor.scale_clamped(&features);
        self.weights.linear_score(scaled.values())
    }

    fn predict(&self, row: &Row, policy: AmountPolicy) -> Option<Prediction> {
        self.raw_score(row, policy).map(Prediction::from_raw_score)
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(&ModelWeights::default(), AmountPolicy::Clamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::prediction::Label;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashMap;

    fn zero_row() -> Row {
        FEATURE_NAMES.iter().map(|&name| (name, 0.0)).collect()
    }

    fn random_row(rng: &mut StdRng) -> Row {
        FEATURE_NAMES
            .iter()
            .map(|&name| {
                let value = match name {
                    "Amount" => rng.gen_range(10.0..1010.0),
                    "Time" => rng.gen_range(0.0..172_800.0),
                    _ => rng.gen_range(-2.0..2.0),
                };
                (name, value)
            })
            .collect()
    }

    #[test]
    fn test_all_zero_row_scores_bias() {
        let scorer = Scorer::default();
        let predictions = scorer.score(&[zero_row()]);

        assert_eq!(predictions.len(), 1);
        let p = predictions[0];
        assert_eq!(p.raw_score, -0.5);
        assert!((p.probability() - 0.3775).abs() < 1e-4);
        assert_eq!(p.label, Label::Legitimate);
        assert!((p.confidence - 0.6225).abs() < 1e-4);
    }

    #[test]
    fn test_missing_features_match_explicit_zeros() {
        let scorer = Scorer::default();
        let predictions = scorer.score(&[Row::new(), zero_row()]);

        assert_eq!(predictions[0], predictions[1]);
    }

    #[test]
    fn test_empty_batch() {
        let scorer = Scorer::default();

        assert!(scorer.score(&[]).is_empty());
        assert!(scorer.score_checked(&[]).is_empty());
        assert_eq!(scorer.score_strict(&[]), Ok(Vec::new()));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let scorer = Scorer::default();
        let mut rng = StdRng::seed_from_u64(7);
        let row = random_row(&mut rng);

        let first = scorer.score(std::slice::from_ref(&row));
        let second = scorer.score(std::slice::from_ref(&row));

        assert_eq!(first[0].raw_score.to_bits(), second[0].raw_score.to_bits());
        assert_eq!(first[0].confidence.to_bits(), second[0].confidence.to_bits());
        assert_eq!(first[0].label, second[0].label);
    }

    #[test]
    fn test_order_and_length_preserved() {
        let scorer = Scorer::default();
        let rows: Vec<Row> = (0..5)
            .map(|i| Row::new().with("V14", i as f64 - 2.0))
            .collect();

        let batch = scorer.score(&rows);

        assert_eq!(batch.len(), rows.len());
        for (row, prediction) in rows.iter().zip(&batch) {
            assert_eq!(scorer.score(std::slice::from_ref(row))[0], *prediction);
        }
        // V14 has a positive weight, so scores rise with the row index
        assert!(batch.windows(2).all(|w| w[0].raw_score < w[1].raw_score));
    }

    #[test]
    fn test_larger_amount_never_lowers_score() {
        let scorer = Scorer::default();
        let base = Row::new().with("V1", 0.3).with("Time", 5_000.0);
        let rows = [
            base.clone().with("Amount", 100.0),
            base.with("Amount", 100_000.0),
        ];

        let predictions = scorer.score(&rows);

        assert!(predictions[1].raw_score >= predictions[0].raw_score);
    }

    #[test]
    fn test_zero_raw_score_boundary() {
        // bias -0.5 cancelled by V14 (weight 0.4)
        let scorer = Scorer::default();
        let row = Row::new().with("V14", 1.25);

        let p = scorer.score(&[row])[0];

        assert_eq!(p.raw_score, 0.0);
        assert_eq!(p.probability(), 0.5);
        assert_eq!(p.label, Label::Legitimate);
        assert_eq!(p.confidence, 0.5);
    }

    #[test]
    fn test_random_batch_properties() {
        let scorer = Scorer::default();
        let mut rng = StdRng::seed_from_u64(42);
        let rows: Vec<Row> = (0..20).map(|_| random_row(&mut rng)).collect();

        let predictions = scorer.score(&rows);

        assert_eq!(predictions.len(), 20);
        for p in &predictions {
            let probability = p.probability();
            assert!((0.5..=1.0).contains(&p.confidence));
            assert_eq!(p.label == Label::Fraudulent, probability > 0.5);
            let expected = if p.label == Label::Fraudulent {
                probability
            } else {
                1.0 - probability
            };
            assert_eq!(p.confidence, expected);
        }
    }

    #[test]
    fn test_alternate_weights_are_independent() {
        let heavy = ModelWeights::new(0.0, HashMap::new()).with_weight("V1", 10.0);
        let heavy_scorer = Scorer::new(&heavy, AmountPolicy::Clamp);
        let default_scorer = Scorer::default();
        let row = Row::new().with("V1", 1.0);

        assert_eq!(heavy_scorer.score(std::slice::from_ref(&row))[0].raw_score, 10.0);
        assert!((default_scorer.score(&[row])[0].raw_score - -0.7).abs() < 1e-12);
    }

    #[test]
    fn test_time_contributes_only_when_weighted() {
        let row = Row::new().with("Time", 172_800.0);
        let unweighted = Scorer::default().score(std::slice::from_ref(&row))[0];
        let weighted = Scorer::new(
            &ModelWeights::default().with_weight("Time", 0.00001),
            AmountPolicy::Clamp,
        )
        .score(&[row])[0];

        assert_eq!(unweighted.raw_score, -0.5);
        assert!((weighted.raw_score - (-0.5 + 0.00001)).abs() < 1e-15);
    }

    #[test]
    fn test_clamp_normalizes_negative_amount() {
        let scorer = Scorer::default();
        let predictions = scorer.score(&[Row::new().with("Amount", -5.0), Row::new()]);

        assert_eq!(predictions[0], predictions[1]);
    }

    #[test]
    fn test_skip_policy_flags_only_bad_rows() {
        let scorer = Scorer::new(&ModelWeights::default(), AmountPolicy::Skip);
        let rows = vec![
            Row::new().with("Amount", 50.0),
            Row::new().with("Amount", -1.0),
            Row::new().with("Amount", -0.5),
        ];

        let results = scorer.score_checked(&rows);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(ScoreError::InvalidAmount {
                row: 1,
                amount: -1.0
            })
        );
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_strict_scoring_fails_fast() {
        let scorer = Scorer::new(&ModelWeights::default(), AmountPolicy::Fail);
        let rows = vec![
            Row::new(),
            Row::new().with("Amount", -10.0),
            Row::new().with("Amount", -20.0),
        ];

        let err = scorer.score_strict(&rows).unwrap_err();

        assert_eq!(err.row(), 1);
        assert!(err.to_string().contains("-10"));
    }

    #[test]
    fn test_clamped_raw_score_agrees_with_clamp_policy() {
        let scorer = Scorer::default();
        for amount in [-50.0, -1.0, -0.3, 0.0, 12.0, 4_000.0] {
            let row = Row::new().with("Amount", amount).with("V2", 0.8);

            assert_eq!(
                Some(scorer.raw_score_clamped(&row)),
                scorer.raw_score(&row, AmountPolicy::Clamp)
            );
        }
    }

    #[test]
    fn test_score_ignores_policy() {
        let scorer = Scorer::new(&ModelWeights::default(), AmountPolicy::Fail);
        let predictions = scorer.score(&[Row::new().with("Amount", -10.0)]);

        assert_eq!(predictions[0].raw_score, -0.5);
    }
}
