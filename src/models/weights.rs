//! Fixed coefficient table for the linear fraud model

use crate::features::{feature_index_ignore_case, FEATURE_COUNT, FEATURE_NAMES};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Intercept of the default model
pub const DEFAULT_BIAS: f64 = -0.5;

/// Default coefficients, keyed by feature name. `Time` carries no weight.
pub const DEFAULT_WEIGHTS: [(&str, f64); 29] = [
    ("V1", -0.2),
    ("V2", 0.15),
    ("V3", -0.3),
    ("V4", 0.25),
    ("V5", -0.1),
    ("V6", 0.2),
    ("V7", -0.25),
    ("V8", 0.1),
    ("V9", -0.15),
    ("V10", 0.3),
    ("V11", -0.2),
    ("V12", 0.35),
    ("V13", -0.1),
    ("V14", 0.4),
    ("V15", -0.3),
    ("V16", 0.2),
    ("V17", -0.25),
    ("V18", 0.15),
    ("V19", -0.2),
    ("V20", 0.1),
    ("V21", -0.15),
    ("V22", 0.25),
    ("V23", -0.3),
    ("V24", 0.2),
    ("V25", -0.1),
    ("V26", 0.15),
    ("V27", -0.2),
    ("V28", 0.1),
    ("Amount", 0.0001),
];

/// Weight vector and bias of the linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelWeights {
    /// Added to every weighted sum
    pub bias: f64,
    /// Coefficient per feature name; features without an entry contribute nothing
    pub weights: HashMap<String, f64>,
}

impl ModelWeights {
    pub fn new(bias: f64, weights: HashMap<String, f64>) -> Self {
        Self { bias, weights }
    }

    /// Set the weight for a single feature
    pub fn with_weight(mut self, feature: &str, weight: f64) -> Self {
        self.weights.insert(feature.to_string(), weight);
        self
    }

    /// Lay the weights out in schema order.
    ///
    /// Names are matched ignoring ASCII case. Names outside the schema, and
    /// case-folded duplicates after the first in sorted order, are dropped
    /// with a warning.
    pub fn resolve(&self) -> ResolvedWeights {
        let mut coefficients = [None; FEATURE_COUNT];

        let mut names: Vec<&String> = self.weights.keys().collect();
        names.sort();

        for name in names {
            let weight = self.weights[name];
            match feature_index_ignore_case(name) {
                Some(index) if coefficients[index].is_none() => {
                    coefficients[index] = Some(weight);
                }
                Some(index) => {
                    warn!(
                        weight = %name,
                        feature = FEATURE_NAMES[index],
                        "Duplicate weight for feature, ignoring"
                    );
                }
                None => {
                    warn!(weight = %name, "Weight does not match any schema feature, ignoring");
                }
            }
        }

        ResolvedWeights {
            bias: self.bias,
            terms: coefficients
                .iter()
                .enumerate()
                .filter_map(|(i, w)| w.map(|w| (i, w)))
                .collect(),
        }
    }
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self {
            bias: DEFAULT_BIAS,
            weights: DEFAULT_WEIGHTS
                .iter()
                .map(|&(name, w)| (name.to_string(), w))
                .collect(),
        }
    }
}

/// Weights bound to schema positions, ready for scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWeights {
    pub bias: f64,
    /// `(schema index, coefficient)` in schema order
    pub terms: Vec<(usize, f64)>,
}

impl ResolvedWeights {
    /// `bias + Σ value[i] * weight[i]` over the weighted features
    pub fn linear_score(&self, values: &[f64; FEATURE_COUNT]) -> f64 {
        self.terms
            .iter()
            .fold(self.bias, |acc, &(i, w)| acc + values[i] * w)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
