//! Churn predictor: encoder, scaler and model behind one read-only context

use crate::advisory::risk_factors;
use crate::error::PredictionError;
use crate::feature_encoder::{FeatureEncoder, FeatureVector};
use crate::models::scaler::StandardScaler;
use crate::models::ChurnModel;
use crate::types::assessment::{ChurnAssessment, RiskTierThresholds};
use crate::types::customer::CustomerRecord;
use std::sync::Arc;
use tracing::debug;

/// Immutable prediction context built once from the training artifacts.
///
/// Shared across requests behind an `Arc`; nothing in it changes after load.
#[derive(Clone)]
pub struct ChurnPredictor {
    model: Arc<dyn ChurnModel>,
    encoder: FeatureEncoder,
    thresholds: RiskTierThresholds,
}

impl ChurnPredictor {
    pub fn new(
        model: Arc<dyn ChurnModel>,
        scaler: StandardScaler,
        thresholds: RiskTierThresholds,
    ) -> Self {
        Self {
            model,
            encoder: FeatureEncoder::new(scaler),
            thresholds,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    /// Validate a record and produce the scaled model input.
    pub fn encode(&self, record: &CustomerRecord) -> Result<FeatureVector, PredictionError> {
        record.validate()?;
        Ok(self.encoder.encode(record))
    }

    /// Churn probability in [0, 1] for a record.
    pub fn predict_proba(&self, record: &CustomerRecord) -> Result<f64, PredictionError> {
        let features = self.encode(record)?;
        let probability = self.model.predict_proba(&features)?;

        if !(0.0..=1.0).contains(&probability) {
            return Err(PredictionError::InvalidProbability {
                model: self.model.name().to_string(),
                value: probability,
            });
        }
        Ok(probability)
    }

    /// Score a record and attach tier advice and risk factors.
    pub fn assess(&self, record: &CustomerRecord) -> Result<ChurnAssessment, PredictionError> {
        let probability = self.predict_proba(record)?;
        let assessment = ChurnAssessment::new(
            self.model.name().to_string(),
            probability,
            &self.thresholds,
            risk_factors(record),
        );

        debug!(
            assessment_id = %assessment.assessment_id,
            probability,
            tier = assessment.tier.as_str(),
            risk_factors = assessment.risk_factors.len(),
            "Churn assessment complete"
        );
        Ok(assessment)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::RecordError;
    use crate::models::scaler::ScalerColumn;
    use crate::types::assessment::RiskTier;
    use crate::types::customer::{
        AddOn, Contract, InternetService, PaymentMethod, PhoneLines, YesNo,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Model returning a fixed probability and counting calls.
    pub(crate) struct FixedModel {
        pub probability: f64,
        pub calls: AtomicUsize,
    }

    impl FixedModel {
        pub(crate) fn new(probability: f64) -> Self {
            Self {
                probability,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ChurnModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict_proba(&self, _features: &FeatureVector) -> Result<f64, PredictionError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.probability)
        }
    }

    /// Model that always fails.
    pub(crate) struct BrokenModel;

    impl ChurnModel for BrokenModel {
        fn name(&self) -> &str {
            "broken"
        }

        fn predict_proba(&self, _features: &FeatureVector) -> Result<f64, PredictionError> {
            Err(PredictionError::Inference {
                model: "broken".to_string(),
                message: "tensor shape mismatch".to_string(),
            })
        }
    }

    pub(crate) fn identity_scaler() -> StandardScaler {
        StandardScaler::new(vec![
            ScalerColumn::new("tenure", 0.0, 1.0),
            ScalerColumn::new("MonthlyCharges", 0.0, 1.0),
            ScalerColumn::new("TotalCharges", 0.0, 1.0),
            ScalerColumn::new("avg_charge_per_month", 0.0, 1.0),
            ScalerColumn::new("num_services", 0.0, 1.0),
        ])
        .unwrap()
    }

    pub(crate) fn predictor_with(model: Arc<dyn ChurnModel>) -> ChurnPredictor {
        ChurnPredictor::new(model, identity_scaler(), RiskTierThresholds::default())
    }

    pub(crate) fn new_fiber_customer() -> CustomerRecord {
        CustomerRecord {
            tenure: 1,
            phone_service: YesNo::Yes,
            multiple_lines: PhoneLines::No,
            internet_service: InternetService::FiberOptic,
            online_security: AddOn::No,
            online_backup: AddOn::No,
            device_protection: AddOn::No,
            tech_support: AddOn::No,
            streaming_tv: AddOn::No,
            streaming_movies: AddOn::No,
            contract: Contract::MonthToMonth,
            paperless_billing: YesNo::Yes,
            payment_method: PaymentMethod::ElectronicCheck,
            monthly_charges: 90.0,
            total_charges: 90.0,
            ..CustomerRecord::default()
        }
    }

    #[test]
    fn test_assess_end_to_end() {
        let predictor = predictor_with(Arc::new(FixedModel::new(0.82)));
        let assessment = predictor.assess(&new_fiber_customer()).unwrap();

        assert_eq!(assessment.model, "fixed");
        assert_eq!(assessment.tier, RiskTier::High);
        assert_eq!(assessment.profile.priority, "HIGH");
        assert_eq!(assessment.risk_factors.len(), 5);
        assert!((assessment.percentage - 82.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_record_never_reaches_model() {
        let model = Arc::new(FixedModel::new(0.5));
        let predictor = predictor_with(model.clone());
        let record = CustomerRecord {
            multiple_lines: PhoneLines::NoPhoneService,
            ..new_fiber_customer()
        };

        let err = predictor.assess(&record).unwrap_err();
        assert!(matches!(
            err,
            PredictionError::InvalidRecord(RecordError::PhoneLinesMismatch { .. })
        ));
        assert_eq!(model.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_out_of_range_probability_rejected() {
        let predictor = predictor_with(Arc::new(FixedModel::new(1.5)));
        let err = predictor.predict_proba(&new_fiber_customer()).unwrap_err();
        assert!(matches!(err, PredictionError::InvalidProbability { value, .. } if value == 1.5));

        let predictor = predictor_with(Arc::new(FixedModel::new(f64::NAN)));
        assert!(predictor.predict_proba(&new_fiber_customer()).is_err());
    }

    #[test]
    fn test_model_failure_is_reported() {
        let predictor = predictor_with(Arc::new(BrokenModel));
        let err = predictor.assess(&new_fiber_customer()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "model broken inference failed: tensor shape mismatch"
        );
    }

    #[test]
    fn test_encode_uses_scaler() {
        let scaler = StandardScaler::new(vec![
            ScalerColumn::new("tenure", 1.0, 2.0),
            ScalerColumn::new("MonthlyCharges", 0.0, 1.0),
            ScalerColumn::new("TotalCharges", 0.0, 1.0),
            ScalerColumn::new("avg_charge_per_month", 0.0, 1.0),
            ScalerColumn::new("num_services", 0.0, 1.0),
        ])
        .unwrap();
        let predictor = ChurnPredictor::new(
            Arc::new(FixedModel::new(0.1)),
            scaler,
            RiskTierThresholds::default(),
        );

        let features = predictor
            .encode(&CustomerRecord {
                tenure: 5,
                ..CustomerRecord::default()
            })
            .unwrap();
        assert_eq!(features.tenure, 2.0);
    }
}
