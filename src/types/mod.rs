//! Type definitions shared by the scorer and its collaborators

pub mod prediction;
pub mod row;

pub use prediction::{Label, Prediction, RiskLevel, RiskLevelThresholds};
pub use row::Row;
