//! Monitor configuration
//!
//! Every field has a default, so an empty JSON object is a valid config.

use serde::{Deserialize, Serialize};

use crate::error::MonitorError;
use crate::labeler::DEFAULT_THRESHOLD;
use crate::store::DEFAULT_HIGH_TEMPERATURE_CUTOFF;

/// Default number of trees in the forest
pub const DEFAULT_TREES: usize = 100;
/// Default RNG seed for bootstrap sampling and feature selection
pub const DEFAULT_SEED: u64 = 42;

/// How many features each split considers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// floor(sqrt(n_features)), at least 1
    Sqrt,
    /// Every feature
    All,
    /// A fixed count, clamped to 1..=n_features
    Count(usize),
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Count(count) => *count,
        };
        n.clamp(1, n_features.max(1))
    }
}

/// Random forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub seed: u64,
    /// None grows trees until leaves are pure
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub max_features: MaxFeatures,
    /// Draw a bootstrap sample per tree
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_TREES,
            seed: DEFAULT_SEED,
            max_depth: None,
            min_samples_split: 2,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Health score at or above which a reading is healthy
    pub threshold: f64,
    /// Summary lists readings strictly above this temperature
    pub high_temperature_cutoff: f64,
    pub forest: ForestConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            high_temperature_cutoff: DEFAULT_HIGH_TEMPERATURE_CUTOFF,
            forest: ForestConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Load and validate a config from JSON
    pub fn from_json(json: &str) -> Result<Self, MonitorError> {
        let config: MonitorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if !self.threshold.is_finite() {
            return Err(MonitorError::InvalidConfig(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        if !self.high_temperature_cutoff.is_finite() {
            return Err(MonitorError::InvalidConfig(format!(
                "high_temperature_cutoff must be finite, got {}",
                self.high_temperature_cutoff
            )));
        }
        if self.forest.n_trees == 0 {
            return Err(MonitorError::InvalidConfig(
                "forest.n_trees must be at least 1".to_string(),
            ));
        }
        if self.forest.min_samples_split < 2 {
            return Err(MonitorError::InvalidConfig(
                "forest.min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.forest.max_depth == Some(0) {
            return Err(MonitorError::InvalidConfig(
                "forest.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
