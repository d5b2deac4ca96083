//! Configuration management for the churn prediction service

use crate::types::assessment::RiskTierThresholds;
use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Serialized model format
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// ONNX graph run with ONNX Runtime
    #[default]
    Onnx,
    /// JSON logistic regression coefficients
    Logistic,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub risk: RiskTierThresholds,
    #[serde(default)]
    pub model_card: ModelCardConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Model, scaler and schema artifact locations
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory the artifact file names are resolved against
    pub models_dir: String,
    #[serde(default)]
    pub model_format: ModelFormat,
    /// Model file name (`.onnx` or logistic `.json`)
    pub model_file: String,
    /// Name reported for the model in assessments
    #[serde(default = "default_model_name")]
    pub model_name: String,
    pub scaler_file: String,
    pub feature_info_file: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_model_name() -> String {
    "churn_model".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

impl ArtifactsConfig {
    pub fn model_path(&self) -> PathBuf {
        Path::new(&self.models_dir).join(&self.model_file)
    }

    pub fn scaler_path(&self) -> PathBuf {
        Path::new(&self.models_dir).join(&self.scaler_file)
    }

    pub fn feature_info_path(&self) -> PathBuf {
        Path::new(&self.models_dir).join(&self.feature_info_file)
    }
}

/// Model facts and business figures shown on the landing page
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelCardConfig {
    pub algorithm: String,
    pub training_rows: String,
    pub accuracy: String,
    pub roc_auc: String,
    pub validation: String,
    /// Customers flagged as likely to churn
    pub at_risk: String,
    pub revenue_risk: String,
    /// Customers expected to be kept by the retention actions
    pub retainable: String,
    pub roi: String,
    pub footer: String,
}

impl Default for ModelCardConfig {
    fn default() -> Self {
        Self {
            algorithm: "Random Forest".to_string(),
            training_rows: "7,000+".to_string(),
            accuracy: "75.7%".to_string(),
            roc_auc: "0.838".to_string(),
            validation: "80-20 split".to_string(),
            at_risk: "288".to_string(),
            revenue_risk: "$288K".to_string(),
            retainable: "86".to_string(),
            roi: "95.8%".to_string(),
            footer: "ChurnRadarAPP v1.0".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from a specific path, with `CHURN_RADAR__*`
    /// environment overrides (e.g. `CHURN_RADAR__SERVER__PORT=9000`).
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("CHURN_RADAR").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tier boundaries that would make a tier unreachable.
    pub fn validate(&self) -> Result<()> {
        let RiskTierThresholds { medium, high } = self.risk;
        if !(0.0 <= medium && medium <= high && high <= 100.0) {
            bail!(
                "risk thresholds must satisfy 0 <= medium <= high <= 100, \
                 got medium={medium}, high={high}"
            );
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8501,
            },
            artifacts: ArtifactsConfig {
                models_dir: "models".to_string(),
                model_format: ModelFormat::Onnx,
                model_file: "churn_model.onnx".to_string(),
                model_name: default_model_name(),
                scaler_file: "scaler.json".to_string(),
                feature_info_file: "feature_info.json".to_string(),
                onnx_threads: 1,
            },
            risk: RiskTierThresholds::default(),
            model_card: ModelCardConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
