//! Churn model artifacts and inference components

pub mod inference;
pub mod loader;
pub mod logistic;
pub mod onnx;
pub mod scaler;
pub mod schema;

use crate::error::PredictionError;
use crate::feature_encoder::FeatureVector;

pub use inference::ChurnPredictor;
pub use loader::ModelLoader;
pub use logistic::LogisticChurnModel;
pub use onnx::OnnxChurnModel;
pub use scaler::StandardScaler;
pub use schema::FeatureSchema;

/// A pre-trained classifier exposing the positive-class probability.
pub trait ChurnModel: Send + Sync {
    /// Model name for logs and reports
    fn name(&self) -> &str;

    /// Probability that the customer churns, in [0, 1].
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, PredictionError>;
}
