//! Fraud Scorer Library
//!
//! Scores tabular card transactions for fraud likelihood with a fixed
//! linear model: schema extraction, per-feature scaling, a weighted sum
//! and a logistic squash, followed by classification and confidence.
//! Ingestion, aggregation and reporting sit around that core.

pub mod config;
pub mod evaluation;
pub mod features;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod sample;
pub mod summary;
pub mod types;

pub use config::AppConfig;
pub use evaluation::Evaluation;
pub use features::{AmountPolicy, FeatureExtractor};
pub use models::{ModelWeights, ScoreError, Scorer};
pub use pipeline::BatchPipeline;
pub use report::ScoringReport;
pub use types::{Label, Prediction, Row};
