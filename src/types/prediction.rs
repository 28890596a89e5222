//! Prediction data structures produced by the scorer

use serde::{Deserialize, Serialize};

/// Binary classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    Legitimate = 0,
    Fraudulent = 1,
}

impl Label {
    pub fn is_fraud(self) -> bool {
        self == Label::Fraudulent
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label as u8
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::Legitimate),
            1 => Ok(Label::Fraudulent),
            other => Err(format!("invalid label {}, expected 0 or 1", other)),
        }
    }
}

/// Scoring result for one input row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    /// Predicted class
    pub label: Label,
    /// Probability mass of the predicted class, in [0.5, 1.0]
    pub confidence: f64,
    /// Bias-adjusted weighted sum before the sigmoid
    pub raw_score: f64,
}

impl Prediction {
    /// Classify a raw score.
    ///
    /// A probability of exactly 0.5 is legitimate with confidence 0.5.
    pub fn from_raw_score(raw_score: f64) -> Self {
        let probability = sigmoid(raw_score);
        let label = if probability > 0.5 {
            Label::Fraudulent
        } else {
            Label::Legitimate
        };
        let confidence = match label {
            Label::Fraudulent => probability,
            Label::Legitimate => 1.0 - probability,
        };

        Self {
            label,
            confidence,
            raw_score,
        }
    }

    /// Fraud probability recovered from the raw score
    pub fn probability(&self) -> f64 {
        sigmoid(self.raw_score)
    }

    /// Presentation bucket for this prediction
    pub fn risk_level(&self, thresholds: &RiskLevelThresholds) -> RiskLevel {
        RiskLevel::from_prediction(self, thresholds)
    }
}

/// Logistic function
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Risk level classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Safe,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
    ];

    /// Bucket a prediction by the confidence of its fraud label.
    ///
    /// Legitimate rows are always `Safe`.
    pub fn from_prediction(prediction: &Prediction, thresholds: &RiskLevelThresholds) -> Self {
        if !prediction.label.is_fraud() {
            RiskLevel::Safe
        } else if prediction.confidence > thresholds.high {
            RiskLevel::High
        } else if prediction.confidence > thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Configurable risk level thresholds (exclusive lower bounds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskLevelThresholds {
    pub medium: f64,
    pub high: f64,
}

impl Default for RiskLevelThresholds {
    fn default() -> Self {
        Self {
            medium: 0.6,
            high: 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_score_sits_on_decision_boundary() {
        let prediction = Prediction::from_raw_score(0.0);

        assert_eq!(prediction.probability(), 0.5);
        assert_eq!(prediction.label, Label::Legitimate);
        assert_eq!(prediction.confidence, 0.5);
    }

    #[test]
    fn test_label_and_confidence_follow_probability() {
        for raw in [-6.0, -1.2, -0.01, 0.01, 0.7, 4.5] {
            let prediction = Prediction::from_raw_score(raw);
            let p = prediction.probability();

            assert_eq!(prediction.label.is_fraud(), p > 0.5);
            if prediction.label.is_fraud() {
                assert_eq!(prediction.confidence, p);
            } else {
                assert_eq!(prediction.confidence, 1.0 - p);
            }
            assert!((0.5..=1.0).contains(&prediction.confidence));
        }
    }

    #[test]
    fn test_risk_level_from_prediction() {
        let thresholds = RiskLevelThresholds::default();
        let level = |raw: f64| Prediction::from_raw_score(raw).risk_level(&thresholds);

        assert_eq!(level(-2.0), RiskLevel::Safe);
        // sigmoid(0.2) ~ 0.55
        assert_eq!(level(0.2), RiskLevel::Low);
        // sigmoid(1.0) ~ 0.73
        assert_eq!(level(1.0), RiskLevel::Medium);
        // sigmoid(2.0) ~ 0.88
        assert_eq!(level(2.0), RiskLevel::High);
    }

    #[test]
    fn test_prediction_serializes_label_as_number() {
        let prediction = Prediction::from_raw_score(3.0);
        let json = serde_json::to_value(prediction).unwrap();

        assert_eq!(json["label"], 1);
        assert!(json.get("rawScore").is_some());

        let back: Prediction = serde_json::from_value(json).unwrap();
        assert_eq!(back.label, Label::Fraudulent);
        assert!((back.raw_score - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_label_rejects_out_of_range_values() {
        assert!(Label::try_from(2).is_err());
    }
}
