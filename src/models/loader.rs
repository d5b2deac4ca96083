//! Artifact loader: scaler, feature schema and model

use crate::config::{ArtifactsConfig, ModelFormat};
use crate::error::ArtifactError;
use crate::models::inference::ChurnPredictor;
use crate::models::logistic::{LogisticChurnModel, LogisticModelFile};
use crate::models::onnx::OnnxChurnModel;
use crate::models::scaler::{ScalerFile, StandardScaler};
use crate::models::schema::FeatureSchema;
use crate::models::ChurnModel;
use crate::types::assessment::RiskTierThresholds;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Loader for the artifacts produced by training
pub struct ModelLoader {
    artifacts: ArtifactsConfig,
}

impl ModelLoader {
    pub fn new(artifacts: ArtifactsConfig) -> Self {
        Self { artifacts }
    }

    /// Load the fitted scaler
    pub fn load_scaler(&self) -> Result<StandardScaler, ArtifactError> {
        let path = self.artifacts.scaler_path();
        let file: ScalerFile = read_json(&path)?;
        let scaler = StandardScaler::from_file(file)?;

        info!(path = %path.display(), "Scaler loaded");
        Ok(scaler)
    }

    /// Load the training feature schema and check it against the encoder
    pub fn load_schema(&self) -> Result<FeatureSchema, ArtifactError> {
        let path = self.artifacts.feature_info_path();
        let schema: FeatureSchema = read_json(&path)?;
        schema.verify()?;

        info!(
            path = %path.display(),
            features = schema.feature_names.len(),
            "Feature schema verified"
        );
        Ok(schema)
    }

    /// Load the classifier in the configured format
    pub fn load_model(&self) -> Result<Arc<dyn ChurnModel>, ArtifactError> {
        let path = self.artifacts.model_path();

        let model: Arc<dyn ChurnModel> = match self.artifacts.model_format {
            ModelFormat::Onnx => Arc::new(OnnxChurnModel::load(
                &path,
                &self.artifacts.model_name,
                self.artifacts.onnx_threads,
            )?),
            ModelFormat::Logistic => {
                let mut file: LogisticModelFile = read_json(&path)?;
                file.name = self.artifacts.model_name.clone();
                Arc::new(LogisticChurnModel::from_file(file)?)
            }
        };

        info!(
            model = %model.name(),
            format = ?self.artifacts.model_format,
            path = %path.display(),
            "Model loaded"
        );
        Ok(model)
    }

    /// Load every artifact and assemble the predictor.
    ///
    /// The schema is verified before the model is loaded.
    pub fn load_predictor(
        &self,
        thresholds: RiskTierThresholds,
    ) -> Result<ChurnPredictor, ArtifactError> {
        self.load_schema()?;
        let scaler = self.load_scaler()?;
        let model = self.load_model()?;

        Ok(ChurnPredictor::new(model, scaler, thresholds))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
