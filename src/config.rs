//! YAML configuration file support for the product-identity pipeline.
//!
//! Deployments tune the engine per tenant (concurrency, timeouts, tier
//! cut-offs, the clustering threshold) from a single YAML file loaded at
//! startup.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # Product-identity pipeline configuration
//! version: "1.0"
//! name: "eu-west-1 production"
//!
//! batch:
//!   max_concurrency: 4
//!   timeout_ms: 30000
//!
//! thresholds:
//!   same_product: 0.92
//!   likely_same: 0.85
//!   possibly_same: 0.75
//!
//! cluster:
//!   threshold: 0.92
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use batch::BatchConfig;
use similarity::SimilarityThresholds;

use crate::cluster::ClusterConfig;

/// Errors that can occur when loading YAML configuration files.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level YAML configuration for the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Configuration format version.
    pub version: String,

    /// Optional configuration name/description.
    #[serde(default)]
    pub name: Option<String>,

    /// Batch execution configuration.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Similarity tier cut-offs.
    #[serde(default)]
    pub thresholds: SimilarityThresholds,

    /// Clustering configuration.
    #[serde(default)]
    pub cluster: ClusterYamlConfig,
}

impl PipelineConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.batch
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.thresholds
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.cluster_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;

        Ok(())
    }

    /// Resolve the runtime clustering configuration.
    ///
    /// An explicit `cluster.threshold` wins; otherwise the same-product tier
    /// cut-off is used, keeping the two sections consistent by default.
    pub fn cluster_config(&self) -> ClusterConfig {
        ClusterConfig {
            threshold: self.cluster.threshold.unwrap_or(self.thresholds.same_product),
            batch: self.batch,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            batch: BatchConfig::default(),
            thresholds: SimilarityThresholds::default(),
            cluster: ClusterYamlConfig::default(),
        }
    }
}

/// Clustering section of the YAML configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterYamlConfig {
    /// Group-membership threshold override. Defaults to the same-product
    /// tier cut-off when absent.
    #[serde(default)]
    pub threshold: Option<f32>,
}
