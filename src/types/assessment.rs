//! Churn assessment data structures

use crate::advisory::{profile_for, TierProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Risk tier derived from the churn percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Determine the tier from a churn percentage in [0, 100].
    ///
    /// Lower bounds are inclusive: exactly `high` is HIGH.
    pub fn from_percentage(percentage: f64, thresholds: &RiskTierThresholds) -> Self {
        if percentage >= thresholds.high {
            RiskTier::High
        } else if percentage >= thresholds.medium {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
        }
    }
}

/// Configurable tier boundaries, in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTierThresholds {
    pub medium: f64,
    pub high: f64,
}

impl Default for RiskTierThresholds {
    fn default() -> Self {
        Self {
            medium: 40.0,
            high: 70.0,
        }
    }
}

/// How strongly a risk factor is flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub fn marker(self) -> &'static str {
        match self {
            Severity::Critical => "🔴",
            Severity::Warning => "🟡",
            Severity::Info => "🔵",
        }
    }
}

/// Informational flag raised by a rule over the raw customer record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub label: String,
    pub severity: Severity,
    pub description: String,
}

/// Outcome of scoring a single customer
#[derive(Debug, Clone, Serialize)]
pub struct ChurnAssessment {
    /// Unique assessment identifier
    pub assessment_id: String,

    /// Model that produced the probability
    pub model: String,

    /// Churn probability (0.0 - 1.0)
    pub probability: f64,

    /// Churn probability in percent
    pub percentage: f64,

    pub tier: RiskTier,

    /// Static advice for the tier
    pub profile: &'static TierProfile,

    /// Rule-based flags, independent of the tier
    pub risk_factors: Vec<RiskFactor>,

    pub timestamp: DateTime<Utc>,
}

impl ChurnAssessment {
    /// Build an assessment from a model probability.
    pub fn new(
        model: String,
        probability: f64,
        thresholds: &RiskTierThresholds,
        risk_factors: Vec<RiskFactor>,
    ) -> Self {
        let percentage = probability * 100.0;
        let tier = RiskTier::from_percentage(percentage, thresholds);

        Self {
            assessment_id: uuid::Uuid::new_v4().to_string(),
            model,
            probability,
            percentage,
            tier,
            profile: profile_for(tier),
            risk_factors,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        let thresholds = RiskTierThresholds::default();

        assert_eq!(RiskTier::from_percentage(70.0, &thresholds), RiskTier::High);
        assert_eq!(RiskTier::from_percentage(69.999, &thresholds), RiskTier::Medium);
        assert_eq!(RiskTier::from_percentage(40.0, &thresholds), RiskTier::Medium);
        assert_eq!(RiskTier::from_percentage(39.999, &thresholds), RiskTier::Low);
        assert_eq!(RiskTier::from_percentage(0.0, &thresholds), RiskTier::Low);
        assert_eq!(RiskTier::from_percentage(100.0, &thresholds), RiskTier::High);
    }

    #[test]
    fn test_high_tier_metrics() {
        let assessment =
            ChurnAssessment::new("stub".to_string(), 0.85, &RiskTierThresholds::default(), vec![]);

        assert_eq!(assessment.tier, RiskTier::High);
        assert_eq!(assessment.profile.timeline, "24-48 hours");
        assert_eq!(assessment.profile.expected_retention, "30%");
    }

    #[test]
    fn test_assessment_serialization() {
        let assessment = ChurnAssessment::new(
            "stub".to_string(),
            0.25,
            &RiskTierThresholds::default(),
            vec![RiskFactor {
                label: "Internet: Fiber".to_string(),
                severity: Severity::Info,
                description: "Higher churn in fiber customers".to_string(),
            }],
        );

        let json = serde_json::to_value(&assessment).unwrap();
        assert_eq!(json["tier"], "low");
        assert_eq!(json["percentage"], 25.0);
        assert_eq!(json["profile"]["priority"], "LOW");
        assert_eq!(json["risk_factors"][0]["severity"], "info");
    }

    fn rank(tier: RiskTier) -> u8 {
        match tier {
            RiskTier::Low => 0,
            RiskTier::Medium => 1,
            RiskTier::High => 2,
        }
    }

    proptest::proptest! {
        #[test]
        fn prop_tier_is_monotonic(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
            let thresholds = RiskTierThresholds::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            proptest::prop_assert!(
                rank(RiskTier::from_percentage(lo, &thresholds))
                    <= rank(RiskTier::from_percentage(hi, &thresholds))
            );
        }
    }
}
