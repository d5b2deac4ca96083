//! Standard scaler fitted at training time

use crate::error::ArtifactError;
use crate::feature_encoder::{FeatureVector, ScaledColumn};
use serde::{Deserialize, Serialize};

/// Persisted parameters for one scaled column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerColumn {
    pub name: String,
    /// Training mean, subtracted first
    #[serde(alias = "mean")]
    pub offset: f64,
    /// Training standard deviation, divided by
    pub scale: f64,
}

impl ScalerColumn {
    pub fn new(name: &str, offset: f64, scale: f64) -> Self {
        Self {
            name: name.to_string(),
            offset,
            scale,
        }
    }
}

/// On-disk scaler artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerFile {
    pub columns: Vec<ScalerColumn>,
}

/// Applies `(value - offset) / scale` to the five numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    params: [(f64, f64); 5],
}

impl StandardScaler {
    /// Build a scaler, requiring exactly one valid entry per scaled column.
    pub fn new(columns: Vec<ScalerColumn>) -> Result<Self, ArtifactError> {
        let mut params: [Option<(f64, f64)>; 5] = [None; 5];

        for column in columns {
            let Some(target) = ScaledColumn::from_name(&column.name) else {
                return Err(ArtifactError::UnexpectedScalerColumn(column.name));
            };
            if !column.scale.is_finite() || column.scale == 0.0 {
                return Err(ArtifactError::InvalidScale {
                    name: column.name,
                    scale: column.scale,
                });
            }
            if !column.offset.is_finite() {
                return Err(ArtifactError::InvalidOffset {
                    name: column.name,
                    offset: column.offset,
                });
            }
            let slot = &mut params[Self::slot(target)];
            if slot.is_some() {
                return Err(ArtifactError::DuplicateScalerColumn(target.name()));
            }
            *slot = Some((column.offset, column.scale));
        }

        let mut resolved = [(0.0, 1.0); 5];
        for column in ScaledColumn::ALL {
            resolved[Self::slot(column)] = params[Self::slot(column)]
                .ok_or(ArtifactError::MissingScalerColumn(column.name()))?;
        }

        Ok(Self { params: resolved })
    }

    pub fn from_file(file: ScalerFile) -> Result<Self, ArtifactError> {
        Self::new(file.columns)
    }

    fn slot(column: ScaledColumn) -> usize {
        match column {
            ScaledColumn::Tenure => 0,
            ScaledColumn::MonthlyCharges => 1,
            ScaledColumn::TotalCharges => 2,
            ScaledColumn::AvgChargePerMonth => 3,
            ScaledColumn::NumServices => 4,
        }
    }

    /// `(offset, scale)` for a column
    pub fn params(&self, column: ScaledColumn) -> (f64, f64) {
        self.params[Self::slot(column)]
    }

    /// Rescale the numeric columns in place; other columns are untouched.
    pub fn transform(&self, features: &mut FeatureVector) {
        for column in ScaledColumn::ALL {
            let (offset, scale) = self.params(column);
            let value = features.scaled_mut(column);
            *value = (*value - offset) / scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<ScalerColumn> {
        vec![
            ScalerColumn::new("tenure", 32.0, 24.0),
            ScalerColumn::new("MonthlyCharges", 65.0, 30.0),
            ScalerColumn::new("TotalCharges", 2280.0, 2260.0),
            ScalerColumn::new("avg_charge_per_month", 60.0, 30.0),
            ScalerColumn::new("num_services", 3.5, 2.0),
        ]
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"{"columns": [
            {"name": "tenure", "mean": 32.0, "scale": 24.0},
            {"name": "MonthlyCharges", "offset": 65.0, "scale": 30.0},
            {"name": "TotalCharges", "offset": 2280.0, "scale": 2260.0},
            {"name": "avg_charge_per_month", "offset": 60.0, "scale": 30.0},
            {"name": "num_services", "offset": 3.5, "scale": 2.0}
        ]}"#;
        let file: ScalerFile = serde_json::from_str(json).unwrap();
        let scaler = StandardScaler::from_file(file).unwrap();

        assert_eq!(scaler.params(ScaledColumn::Tenure), (32.0, 24.0));
        assert_eq!(scaler.params(ScaledColumn::NumServices), (3.5, 2.0));
    }

    #[test]
    fn test_missing_column_rejected() {
        let mut cols = columns();
        cols.retain(|c| c.name != "num_services");

        let err = StandardScaler::new(cols).unwrap_err();
        assert!(matches!(err, ArtifactError::MissingScalerColumn("num_services")));
    }

    #[test]
    fn test_unknown_column_rejected() {
        let mut cols = columns();
        cols.push(ScalerColumn::new("SeniorCitizen", 0.1, 0.3));

        let err = StandardScaler::new(cols).unwrap_err();
        assert!(
            matches!(err, ArtifactError::UnexpectedScalerColumn(name) if name == "SeniorCitizen")
        );
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut cols = columns();
        cols.insert(1, ScalerColumn::new("tenure", 0.0, 1.0));

        let err = StandardScaler::new(cols).unwrap_err();
        assert!(matches!(err, ArtifactError::DuplicateScalerColumn("tenure")));
    }

    #[test]
    fn test_zero_scale_rejected() {
        let mut cols = columns();
        cols[2].scale = 0.0;

        let err = StandardScaler::new(cols).unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidScale { .. }));
    }

    #[test]
    fn test_transform_is_standard_scaling() {
        let scaler = StandardScaler::new(columns()).unwrap();
        let mut features =
            crate::feature_encoder::FeatureEncoder::encode_raw(&Default::default());
        let raw_tenure = features.tenure;

        scaler.transform(&mut features);

        assert_eq!(features.tenure, (raw_tenure - 32.0) / 24.0);
        assert_eq!(features.gender_male, 1.0);
    }
}
