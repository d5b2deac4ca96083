//! Logistic regression model stored as JSON coefficients

use crate::error::{ArtifactError, PredictionError};
use crate::feature_encoder::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::models::ChurnModel;
use serde::Deserialize;
use std::collections::HashMap;

/// On-disk logistic model artifact
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticModelFile {
    #[serde(default = "default_name")]
    pub name: String,
    pub intercept: f64,
    /// Coefficient per feature name; absent features weigh 0
    pub coefficients: HashMap<String, f64>,
}

fn default_name() -> String {
    "logistic_regression".to_string()
}

/// `sigmoid(intercept + w · x)` over the encoded feature vector.
#[derive(Debug, Clone)]
pub struct LogisticChurnModel {
    name: String,
    intercept: f64,
    weights: [f64; FEATURE_COUNT],
}

impl LogisticChurnModel {
    pub fn from_file(file: LogisticModelFile) -> Result<Self, ArtifactError> {
        let mut weights = [0.0; FEATURE_COUNT];

        for (feature, weight) in file.coefficients {
            let index = FEATURE_NAMES
                .iter()
                .position(|&n| n == feature)
                .ok_or_else(|| ArtifactError::UnknownCoefficient(feature.clone()))?;
            weights[index] = weight;
        }

        Ok(Self {
            name: file.name,
            intercept: file.intercept,
            weights,
        })
    }

    fn logit(&self, features: &FeatureVector) -> f64 {
        self.weights
            .iter()
            .zip(features.values())
            .fold(self.intercept, |acc, (w, x)| acc + w * x)
    }
}

impl ChurnModel for LogisticChurnModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        let z = self.logit(features);
        if !z.is_finite() {
            return Err(PredictionError::Inference {
                model: self.name.clone(),
                message: format!("non-finite logit {z}"),
            });
        }
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}
