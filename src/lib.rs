//! ChurnRadar Library
//!
//! Telecom customer churn scoring: encodes a customer profile into the
//! training feature layout, scores it with a trained classifier and turns
//! the probability into a risk tier with retention advice.

pub mod advisory;
pub mod config;
pub mod error;
pub mod feature_encoder;
pub mod metrics;
pub mod models;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{ArtifactError, PredictionError, RecordError};
pub use feature_encoder::{FeatureEncoder, FeatureVector};
pub use models::{ChurnModel, ChurnPredictor, ModelLoader};
pub use types::{ChurnAssessment, CustomerRecord, RiskTier};
