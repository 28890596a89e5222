//! Feature extraction and scaling for the linear fraud model.
//!
//! Rows arrive as loose name/value mappings. The extractor pins them to
//! the fixed 30-feature schema (`Time`, `V1`..`V28`, `Amount`) and the
//! scaler applies the per-feature transforms the weights were fitted on.

use crate::types::row::Row;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Number of features in the schema
pub const FEATURE_COUNT: usize = 30;

/// Feature names in schema order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Time", "V1", "V2", "V3", "V4", "V5", "V6", "V7", "V8", "V9", "V10", "V11", "V12", "V13",
    "V14", "V15", "V16", "V17", "V18", "V19", "V20", "V21", "V22", "V23", "V24", "V25", "V26",
    "V27", "V28", "Amount",
];

pub const TIME_INDEX: usize = 0;
pub const AMOUNT_INDEX: usize = FEATURE_COUNT - 1;

/// Seconds covered by the source dataset (two days); `Time` is divided by this.
pub const TIME_SCALE: f64 = 172_800.0;

/// `ln(Amount + 1)` is divided by this.
pub const AMOUNT_LOG_DIVISOR: f64 = 10.0;

/// Position of a feature in the schema, exact match.
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|&f| f == name)
}

/// Position of a feature in the schema, ignoring ASCII case.
pub fn feature_index_ignore_case(name: &str) -> Option<usize> {
    FEATURE_NAMES
        .iter()
        .position(|f| f.eq_ignore_ascii_case(name))
}

/// How amounts outside the domain of `ln(Amount + 1)` are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountPolicy {
    /// Negative amounts are read as zero before the log. Never rejects.
    #[default]
    Clamp,
    /// Rows with `Amount <= -1` are flagged and left out; the batch continues.
    Skip,
    /// The first row with `Amount <= -1` fails the whole batch.
    Fail,
}

impl AmountPolicy {
    /// Whether out-of-domain amounts are rejected rather than normalized
    pub fn rejects(self) -> bool {
        !matches!(self, AmountPolicy::Clamp)
    }
}

/// Fixed-order feature values for one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn zeros() -> Self {
        Self([0.0; FEATURE_COUNT])
    }

    /// Look up a feature by schema name
    pub fn get(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|i| self.0[i])
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn amount(&self) -> f64 {
        self.0[AMOUNT_INDEX]
    }

    pub fn time(&self) -> f64 {
        self.0[TIME_INDEX]
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

/// Transforms raw rows into scaled model inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Pin a row to the schema.
    ///
    /// Absent features and non-finite values both read as 0.0, so a missing
    /// column, a NaN cell and an explicit zero are indistinguishable after
    /// extraction. Columns outside the schema are ignored.
    pub fn extract(&self, row: &Row) -> FeatureVector {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
            *slot = sanitize(row.get(name));
        }
        FeatureVector(values)
    }

    /// Apply per-feature scaling.
    ///
    /// Returns `None` when the policy rejects an amount at or below -1,
    /// where `ln(Amount + 1)` is undefined.
    pub fn scale(&self, features: &FeatureVector, policy: AmountPolicy) -> Option<FeatureVector> {
        let mut scaled = features.0;
        scaled[TIME_INDEX] = scale_time(features.time());
        scaled[AMOUNT_INDEX] = scale_amount(features.amount(), policy)?;
        Some(FeatureVector(scaled))
    }

    /// Apply per-feature scaling with negative amounts read as zero.
    pub fn scale_clamped(&self, features: &FeatureVector) -> FeatureVector {
        let mut scaled = features.0;
        scaled[TIME_INDEX] = scale_time(features.time());
        scaled[AMOUNT_INDEX] = scale_amount_clamped(features.amount());
        FeatureVector(scaled)
    }

    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

fn sanitize(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// `Time / 172800`
pub fn scale_time(time: f64) -> f64 {
    time / TIME_SCALE
}

/// `ln(Amount + 1) / 10`, subject to the amount policy.
pub fn scale_amount(amount: f64, policy: AmountPolicy) -> Option<f64> {
    if !policy.rejects() {
        return Some(scale_amount_clamped(amount));
    }
    if amount <= -1.0 {
        return None;
    }
    Some(amount.ln_1p() / AMOUNT_LOG_DIVISOR)
}

/// `ln(max(Amount, 0) + 1) / 10`
pub fn scale_amount_clamped(amount: f64) -> f64 {
    amount.max(0.0).ln_1p() / AMOUNT_LOG_DIVISOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_layout() {
        let extractor = FeatureExtractor::new();

        assert_eq!(extractor.feature_count(), 30);
        assert_eq!(extractor.feature_names()[TIME_INDEX], "Time");
        assert_eq!(extractor.feature_names()[AMOUNT_INDEX], "Amount");
        assert_eq!(feature_index("V14"), Some(14));
        assert_eq!(feature_index("v14"), None);
        assert_eq!(feature_index_ignore_case("v14"), Some(14));
        assert_eq!(feature_index("Class"), None);
    }

    #[test]
    fn test_extract_defaults_missing_and_ignores_extras() {
        let extractor = FeatureExtractor::new();
        let row = Row::new()
            .with("V3", 1.25)
            .with("Amount", 99.0)
            .with("Class", 1.0);

        let features = extractor.extract(&row);

        assert_eq!(features.get("V3"), Some(1.25));
        assert_eq!(features.amount(), 99.0);
        assert_eq!(features.get("V4"), Some(0.0));
        assert_eq!(features.time(), 0.0);
        assert_eq!(features.get("Class"), None);
    }

    #[test]
    fn test_extract_treats_non_finite_as_missing() {
        let extractor = FeatureExtractor::new();
        let row = Row::new()
            .with("V1", f64::NAN)
            .with("V2", f64::INFINITY)
            .with("V3", f64::NEG_INFINITY);

        assert_eq!(extractor.extract(&row), FeatureVector::zeros());
    }

    #[test]
    fn test_scale_time_and_amount() {
        let extractor = FeatureExtractor::new();
        let row = Row::new()
            .with("Time", 86_400.0)
            .with("Amount", std::f64::consts::E - 1.0)
            .with("V7", -0.75);

        let scaled = extractor
            .scale(&extractor.extract(&row), AmountPolicy::Clamp)
            .unwrap();

        assert!((scaled.time() - 0.5).abs() < 1e-12);
        assert!((scaled.amount() - 0.1).abs() < 1e-12);
        assert_eq!(scaled.get("V7"), Some(-0.75));
    }

    #[test]
    fn test_zero_inputs_scale_to_zero() {
        let extractor = FeatureExtractor::new();
        let scaled = extractor
            .scale(&FeatureVector::zeros(), AmountPolicy::Clamp)
            .unwrap();

        assert_eq!(scaled, FeatureVector::zeros());
    }

    #[test]
    fn test_scale_clamped_matches_clamp_policy() {
        let extractor = FeatureExtractor::new();
        let row = Row::new().with("Amount", -7.5).with("Time", 43_200.0);
        let features = extractor.extract(&row);

        let clamped = extractor.scale_clamped(&features);

        assert_eq!(Some(clamped), extractor.scale(&features, AmountPolicy::Clamp));
        assert_eq!(clamped.amount(), 0.0);
        assert_eq!(scale_amount_clamped(-1.0), 0.0);
    }

    #[test]
    fn test_amount_policy_at_domain_edge() {
        // Clamp normalizes any negative amount to zero
        assert_eq!(scale_amount(-1.0, AmountPolicy::Clamp), Some(0.0));
        assert_eq!(scale_amount(-250.0, AmountPolicy::Clamp), Some(0.0));
        assert_eq!(scale_amount(-0.5, AmountPolicy::Clamp), Some(0.0));

        assert_eq!(scale_amount(-1.0, AmountPolicy::Skip), None);
        assert_eq!(scale_amount(-3.0, AmountPolicy::Fail), None);

        // Still inside the log's domain
        let edge = scale_amount(-0.5, AmountPolicy::Fail).unwrap();
        assert!((edge - 0.5_f64.ln() / 10.0).abs() < 1e-12);
    }
}
