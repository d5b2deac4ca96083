//! Static retention advice and rule-based risk factors.
//!
//! Tier content is plain data keyed by tier; nothing here looks at the model.

use crate::types::assessment::{RiskFactor, RiskTier, Severity};
use crate::types::customer::{Contract, CustomerRecord, InternetService, PaymentMethod};
use serde::Serialize;

/// Tenure below which a customer is in the critical early period.
pub const LOW_TENURE_MONTHS: u32 = 12;
/// Monthly charges above which the bill is flagged as high.
pub const HIGH_MONTHLY_CHARGES: f64 = 70.0;

/// One recommended retention action
#[derive(Debug, Serialize)]
pub struct RetentionAction {
    pub icon: &'static str,
    pub title: &'static str,
    pub detail: &'static str,
}

/// Fixed presentation content for a risk tier
#[derive(Debug, Serialize)]
pub struct TierProfile {
    pub tier: RiskTier,
    pub priority: &'static str,
    pub headline: &'static str,
    pub banner: &'static str,
    pub actions_title: &'static str,
    pub actions: &'static [RetentionAction],
    pub timeline: &'static str,
    pub expected_retention: &'static str,
}

static HIGH: TierProfile = TierProfile {
    tier: RiskTier::High,
    priority: "HIGH",
    headline: "URGENT ACTION",
    banner: "URGENT ACTION REQUIRED",
    actions_title: "Immediate Actions (24-48 hours)",
    actions: &[
        RetentionAction {
            icon: "📞",
            title: "Personal Call",
            detail: "Contact customer immediately",
        },
        RetentionAction {
            icon: "💰",
            title: "Special Offer",
            detail: "20-30% discount for 6-month commitment",
        },
        RetentionAction {
            icon: "🎁",
            title: "Free Upgrade",
            detail: "Premium services for 3 months",
        },
        RetentionAction {
            icon: "🤝",
            title: "Account Manager",
            detail: "Assign dedicated support",
        },
    ],
    timeline: "24-48 hours",
    expected_retention: "30%",
};

static MEDIUM: TierProfile = TierProfile {
    tier: RiskTier::Medium,
    priority: "MEDIUM",
    headline: "PROACTIVE ENGAGEMENT",
    banner: "PROACTIVE ENGAGEMENT NEEDED",
    actions_title: "Recommended Actions (1-2 weeks)",
    actions: &[
        RetentionAction {
            icon: "📧",
            title: "Email Campaign",
            detail: "Send retention offer",
        },
        RetentionAction {
            icon: "🎯",
            title: "Promotion",
            detail: "10-15% discount on annual upgrade",
        },
        RetentionAction {
            icon: "📊",
            title: "Usage Review",
            detail: "Optimize service bundle",
        },
        RetentionAction {
            icon: "⭐",
            title: "Loyalty Program",
            detail: "VIP benefits",
        },
    ],
    timeline: "1-2 weeks",
    expected_retention: "50%",
};

static LOW: TierProfile = TierProfile {
    tier: RiskTier::Low,
    priority: "LOW",
    headline: "MAINTAIN SATISFACTION",
    banner: "MAINTAIN SATISFACTION",
    actions_title: "Maintenance Actions",
    actions: &[
        RetentionAction {
            icon: "😊",
            title: "Regular Check-ins",
            detail: "Quarterly survey",
        },
        RetentionAction {
            icon: "🎉",
            title: "Appreciation",
            detail: "Thank you message",
        },
        RetentionAction {
            icon: "📈",
            title: "Upsell",
            detail: "Introduce new features",
        },
        RetentionAction {
            icon: "🌟",
            title: "Referral Program",
            detail: "Encourage word-of-mouth",
        },
    ],
    timeline: "Quarterly",
    expected_retention: "80%",
};

/// Look up the static content for a tier.
pub fn profile_for(tier: RiskTier) -> &'static TierProfile {
    match tier {
        RiskTier::High => &HIGH,
        RiskTier::Medium => &MEDIUM,
        RiskTier::Low => &LOW,
    }
}

/// Run the fixed risk-factor rules over a raw record, in display order.
pub fn risk_factors(record: &CustomerRecord) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    if record.contract == Contract::MonthToMonth {
        factors.push(RiskFactor {
            label: "Contract: Month-to-month".to_string(),
            severity: Severity::Critical,
            description: "3x higher churn rate".to_string(),
        });
    }

    if record.tenure < LOW_TENURE_MONTHS {
        factors.push(RiskFactor {
            label: "Low Tenure".to_string(),
            severity: Severity::Critical,
            description: format!("Only {} months - critical period", record.tenure),
        });
    }

    if record.payment_method == PaymentMethod::ElectronicCheck {
        factors.push(RiskFactor {
            label: "Payment: E-check".to_string(),
            severity: Severity::Warning,
            description: "Associated with higher churn".to_string(),
        });
    }

    if record.monthly_charges > HIGH_MONTHLY_CHARGES {
        factors.push(RiskFactor {
            label: "High Charges".to_string(),
            severity: Severity::Warning,
            description: format!("${:.0}/month - above average", record.monthly_charges),
        });
    }

    if record.internet_service == InternetService::FiberOptic {
        factors.push(RiskFactor {
            label: "Internet: Fiber".to_string(),
            severity: Severity::Info,
            description: "Higher churn in fiber customers".to_string(),
        });
    }

    factors
}
