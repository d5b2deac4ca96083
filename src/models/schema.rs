//! Training-time feature schema shipped next to the model

use crate::error::ArtifactError;
use crate::feature_encoder::{FEATURE_COUNT, FEATURE_NAMES};
use serde::{Deserialize, Serialize};

/// Contents of `feature_info.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub feature_names: Vec<String>,
}

impl FeatureSchema {
    /// Check that the model's columns match the encoder's, name for name and
    /// in the same order.
    pub fn verify(&self) -> Result<(), ArtifactError> {
        for (index, (expected, actual)) in self.feature_names.iter().zip(FEATURE_NAMES).enumerate()
        {
            if expected != actual {
                return Err(ArtifactError::SchemaMismatch {
                    index,
                    expected: expected.clone(),
                    actual: actual.to_string(),
                });
            }
        }

        if self.feature_names.len() != FEATURE_COUNT {
            return Err(ArtifactError::FeatureCountMismatch {
                expected: self.feature_names.len(),
                actual: FEATURE_COUNT,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder_schema() -> FeatureSchema {
        FeatureSchema {
            feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }

    #[test]
    fn test_encoder_schema_verifies() {
        assert!(encoder_schema().verify().is_ok());
    }

    #[test]
    fn test_reordered_schema_rejected() {
        let mut schema = encoder_schema();
        schema.feature_names.swap(1, 2);

        match schema.verify() {
            Err(ArtifactError::SchemaMismatch {
                index,
                expected,
                actual,
            }) => {
                assert_eq!(index, 1);
                assert_eq!(expected, "Dependents");
                assert_eq!(actual, "Partner");
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_renamed_column_rejected() {
        let mut schema = encoder_schema();
        schema.feature_names[27] = "Contract_One Year".to_string();

        assert!(matches!(
            schema.verify(),
            Err(ArtifactError::SchemaMismatch { index: 27, .. })
        ));
    }

    #[test]
    fn test_truncated_or_extended_schema_rejected() {
        let mut schema = encoder_schema();
        schema.feature_names.pop();
        assert!(matches!(
            schema.verify(),
            Err(ArtifactError::FeatureCountMismatch {
                expected: 34,
                actual: 35
            })
        ));

        let mut schema = encoder_schema();
        schema.feature_names.push("extra".to_string());
        assert!(matches!(
            schema.verify(),
            Err(ArtifactError::FeatureCountMismatch { expected: 36, .. })
        ));
    }
}
