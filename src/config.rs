//! Configuration management for the fraud scorer

use crate::features::AmountPolicy;
use crate::models::weights::ModelWeights;
use crate::sample::DEFAULT_SAMPLE_ROWS;
use crate::types::prediction::RiskLevelThresholds;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Prefix for environment overrides, e.g. `FRAUD_SCORER__PIPELINE__WORKERS=8`
pub const ENV_PREFIX: &str = "FRAUD_SCORER";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub detection: DetectionConfig,
    pub pipeline: PipelineConfig,
    pub sample: SampleConfig,
    pub logging: LoggingConfig,
}

/// Linear model configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Intercept added to every weighted sum
    pub bias: f64,
    /// Coefficient per feature name
    pub weights: std::collections::HashMap<String, f64>,
    /// Treatment of amounts at or below -1: clamp, skip or fail
    pub amount_policy: AmountPolicy,
}

impl ModelConfig {
    pub fn model_weights(&self) -> ModelWeights {
        ModelWeights::new(self.bias, self.weights.clone())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        let defaults = ModelWeights::default();
        Self {
            bias: defaults.bias,
            weights: defaults.weights,
            amount_policy: AmountPolicy::default(),
        }
    }
}

/// Detection configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Confidence bounds for bucketing fraud-labelled rows
    pub risk_levels: RiskLevelThresholds,
}

/// Batch pipeline configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of batches scored concurrently
    pub workers: usize,
    /// Rows per batch
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            batch_size: 256,
        }
    }
}

/// Synthetic sample configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub rows: usize,
    /// Fixed seed for reproducible samples
    pub seed: Option<u64>,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_SAMPLE_ROWS,
            seed: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path, falling back to defaults
    /// when the file does not exist
    pub fn load() -> Result<Self> {
        Self::build(File::with_name(DEFAULT_CONFIG_PATH).required(false))
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::build(File::from(path.as_ref()))
    }

    fn build<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        app.validate()?;
        Ok(app)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.workers == 0 {
            anyhow::bail!("pipeline.workers must be at least 1");
        }
        if self.pipeline.batch_size == 0 {
            anyhow::bail!("pipeline.batch_size must be at least 1");
        }
        let levels = &self.detection.risk_levels;
        if !(0.5..=1.0).contains(&levels.medium) || !(levels.medium..=1.0).contains(&levels.high) {
            anyhow::bail!(
                "detection.risk_levels must satisfy 0.5 <= medium <= high <= 1.0 (got medium={}, high={})",
                levels.medium,
                levels.high
            );
        }
        if !self.model.bias.is_finite() || self.model.weights.values().any(|w| !w.is_finite()) {
            anyhow::bail!("model.bias and model.weights must be finite");
        }
        Ok(())
    }
}
