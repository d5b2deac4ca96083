//! Error types for record validation, artifact loading and scoring

use crate::types::customer::{AddOn, InternetService, PhoneLines, YesNo};
use std::path::PathBuf;
use thiserror::Error;

/// A customer record that cannot be encoded.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("tenure must be between 0 and {max} months, got {value}")]
    TenureOutOfRange { value: u32, max: u32 },

    #[error("{field} must be a finite value between 0 and {max}, got {value}")]
    ChargeOutOfRange {
        field: &'static str,
        value: f64,
        max: f64,
    },

    #[error(
        "multiple_lines is {multiple_lines} but phone_service is {phone_service}; \
         expected \"No phone service\" exactly when phone service is absent"
    )]
    PhoneLinesMismatch {
        phone_service: YesNo,
        multiple_lines: PhoneLines,
    },

    #[error(
        "{field} is {value} but internet_service is {internet_service}; \
         expected \"No internet service\" exactly when internet service is absent"
    )]
    AddOnMismatch {
        field: &'static str,
        value: AddOn,
        internet_service: InternetService,
    },
}

/// Failure to load or verify the model, scaler or feature schema.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("scaler is missing parameters for column {0:?}")]
    MissingScalerColumn(&'static str),

    #[error("scaler lists column {0:?} more than once")]
    DuplicateScalerColumn(&'static str),

    #[error("scaler has parameters for column {0:?}, which is not a rescaled feature")]
    UnexpectedScalerColumn(String),

    #[error("scaler column {name:?} has invalid scale {scale}")]
    InvalidScale { name: String, scale: f64 },

    #[error("scaler column {name:?} has non-finite offset {offset}")]
    InvalidOffset { name: String, offset: f64 },

    #[error("model expects {expected} features but the encoder produces {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("feature schema mismatch at position {index}: model expects {expected:?}, encoder produces {actual:?}")]
    SchemaMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("model coefficient refers to unknown feature {0:?}")]
    UnknownCoefficient(String),

    #[error("failed to load ONNX model from {path}: {message}")]
    Onnx { path: PathBuf, message: String },
}

/// Failure while scoring a single record.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("invalid customer record: {0}")]
    InvalidRecord(#[from] RecordError),

    #[error("model {model} returned an invalid probability {value}")]
    InvalidProbability { model: String, value: f64 },

    #[error("model {model} inference failed: {message}")]
    Inference { model: String, message: String },
}
