//! Raw transaction rows as handed over by the ingestion layer

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single transaction row: feature name to numeric value.
///
/// Rows are not validated. Keys outside the feature schema are carried
/// along but ignored by the scorer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(HashMap<String, f64>);

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Set a feature value, returning the row for chaining
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a feature value
    pub fn insert(&mut self, name: &str, value: f64) {
        self.0.insert(name.to_string(), value);
    }

    /// Look up a feature value
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Number of columns present in the row
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the columns present in the row
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Row {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<HashMap<String, f64>> for Row {
    fn from(values: HashMap<String, f64>) -> Self {
        Self(values)
    }
}
