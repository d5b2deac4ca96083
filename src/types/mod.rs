//! Type definitions for churn prediction

pub mod assessment;
pub mod customer;

pub use assessment::{ChurnAssessment, RiskFactor, RiskTier, RiskTierThresholds, Severity};
pub use customer::{CustomerForm, CustomerRecord};
