//! Evaluation against ground-truth labels.
//!
//! Uploads taken from the labelled dataset carry a `Class` column (1 for
//! fraud, 0 otherwise). When every scored row has one, predictions are
//! compared against it: a confusion matrix over the hard labels and an ROC
//! curve over the fraud probabilities.

use crate::pipeline::ScoredRow;
use crate::types::prediction::{Label, Prediction};
use crate::types::row::Row;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ground-truth column name
pub const CLASS_COLUMN: &str = "Class";

/// Counts of predicted vs actual labels, fraud as the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    pub fn record(&mut self, actual: Label, predicted: Label) {
        match (actual, predicted) {
            (Label::Fraudulent, Label::Fraudulent) => self.true_positives += 1,
            (Label::Legitimate, Label::Fraudulent) => self.false_positives += 1,
            (Label::Legitimate, Label::Legitimate) => self.true_negatives += 1,
            (Label::Fraudulent, Label::Legitimate) => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> Option<f64> {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    pub fn precision(&self) -> Option<f64> {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> Option<f64> {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }
}

/// One operating point of the ROC curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RocPoint {
    /// Rows with probability >= threshold are called fraud; `None` is the
    /// origin, where nothing is
    pub threshold: Option<f64>,
    pub false_positive_rate: f64,
    pub true_positive_rate: f64,
}

/// Model quality on a labelled batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub confusion: ConfusionMatrix,
    /// Empty when only one class is present
    pub roc: Vec<RocPoint>,
    /// Area under `roc`; `None` when only one class is present
    pub auc: Option<f64>,
}

impl Evaluation {
    /// Compare predictions with actual labels, pairwise.
    ///
    /// Extra entries on either side are ignored.
    pub fn from_labels(actual: &[Label], predictions: &[Prediction]) -> Self {
        let mut confusion = ConfusionMatrix::default();
        let mut scored: Vec<(f64, Label)> = Vec::with_capacity(actual.len());

        for (&label, prediction) in actual.iter().zip(predictions) {
            confusion.record(label, prediction.label);
            scored.push((prediction.probability(), label));
        }

        let roc = roc_curve(&mut scored);
        let auc = (!roc.is_empty()).then(|| area_under(&roc));

        Self {
            confusion,
            roc,
            auc,
        }
    }

    /// Evaluate a pipeline run against the `Class` column of its input.
    ///
    /// Returns `None` unless every scored row carries a `Class` value.
    pub fn from_rows(rows: &[Row], scored: &[ScoredRow]) -> Option<Self> {
        if scored.is_empty() {
            return None;
        }

        let actual = scored
            .iter()
            .map(|s| rows.get(s.index)?.get(CLASS_COLUMN).map(class_label))
            .collect::<Option<Vec<Label>>>()?;
        let predictions: Vec<Prediction> = scored.iter().map(|s| s.prediction).collect();

        Some(Self::from_labels(&actual, &predictions))
    }
}

/// `Class` value 1 is fraud; anything else is legitimate.
pub fn class_label(value: f64) -> Label {
    if value == 1.0 {
        Label::Fraudulent
    } else {
        Label::Legitimate
    }
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

/// One point per distinct probability, highest threshold first, starting
/// at the origin.
fn roc_curve(scored: &mut [(f64, Label)]) -> Vec<RocPoint> {
    let positives = scored.iter().filter(|(_, l)| l.is_fraud()).count();
    let negatives = scored.len() - positives;
    if positives == 0 || negatives == 0 {
        return Vec::new();
    }

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let mut points = vec![RocPoint {
        threshold: None,
        false_positive_rate: 0.0,
        true_positive_rate: 0.0,
    }];
    let (mut tp, mut fp) = (0usize, 0usize);

    for (i, &(probability, label)) in scored.iter().enumerate() {
        if label.is_fraud() {
            tp += 1;
        } else {
            fp += 1;
        }
        let group_ends = scored
            .get(i + 1)
            .map_or(true, |&(next, _)| next != probability);
        if group_ends {
            points.push(RocPoint {
                threshold: Some(probability),
                false_positive_rate: fp as f64 / negatives as f64,
                true_positive_rate: tp as f64 / positives as f64,
            });
        }
    }

    points
}

/// Trapezoidal area under the curve
fn area_under(points: &[RocPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| {
            let width = w[1].false_positive_rate - w[0].false_positive_rate;
            width * (w[0].true_positive_rate + w[1].true_positive_rate) / 2.0
        })
        .sum()
}
