//! Feature encoding for churn model inference.
//!
//! Maps a customer record to the exact column layout the model saw during
//! training: binary flags, two engineered features, one-hot indicators with
//! the first level of each category dropped, then standard scaling of the
//! five numeric columns.

use crate::models::scaler::StandardScaler;
use crate::types::customer::{
    AddOn, Contract, CustomerRecord, Gender, InternetService, PaymentMethod, PhoneLines, YesNo,
};

/// Number of model input columns.
pub const FEATURE_COUNT: usize = 35;

/// Column names in training order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    // Binary and numeric (10)
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "tenure",
    "PhoneService",
    "PaperlessBilling",
    "MonthlyCharges",
    "TotalCharges",
    "avg_charge_per_month",
    "num_services",
    // One-hot (25)
    "gender_Male",
    "MultipleLines_No phone service",
    "MultipleLines_Yes",
    "InternetService_Fiber optic",
    "InternetService_No",
    "OnlineSecurity_No internet service",
    "OnlineSecurity_Yes",
    "OnlineBackup_No internet service",
    "OnlineBackup_Yes",
    "DeviceProtection_No internet service",
    "DeviceProtection_Yes",
    "TechSupport_No internet service",
    "TechSupport_Yes",
    "StreamingTV_No internet service",
    "StreamingTV_Yes",
    "StreamingMovies_No internet service",
    "StreamingMovies_Yes",
    "Contract_One year",
    "Contract_Two year",
    "PaymentMethod_Credit card (automatic)",
    "PaymentMethod_Electronic check",
    "PaymentMethod_Mailed check",
    "tenure_group_1-2yr",
    "tenure_group_2-4yr",
    "tenure_group_4+yr",
];

/// The numeric columns rescaled with the fitted scaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaledColumn {
    Tenure,
    MonthlyCharges,
    TotalCharges,
    AvgChargePerMonth,
    NumServices,
}

impl ScaledColumn {
    pub const ALL: [ScaledColumn; 5] = [
        ScaledColumn::Tenure,
        ScaledColumn::MonthlyCharges,
        ScaledColumn::TotalCharges,
        ScaledColumn::AvgChargePerMonth,
        ScaledColumn::NumServices,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScaledColumn::Tenure => "tenure",
            ScaledColumn::MonthlyCharges => "MonthlyCharges",
            ScaledColumn::TotalCharges => "TotalCharges",
            ScaledColumn::AvgChargePerMonth => "avg_charge_per_month",
            ScaledColumn::NumServices => "num_services",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Tenure bucket; `0-1yr` is the dropped baseline level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenureGroup {
    UpToOneYear,
    OneToTwoYears,
    TwoToFourYears,
    OverFourYears,
}

impl TenureGroup {
    /// Bucket a tenure in months; upper bounds are inclusive.
    pub fn from_tenure(tenure: u32) -> Self {
        match tenure {
            0..=12 => TenureGroup::UpToOneYear,
            13..=24 => TenureGroup::OneToTwoYears,
            25..=48 => TenureGroup::TwoToFourYears,
            _ => TenureGroup::OverFourYears,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TenureGroup::UpToOneYear => "0-1yr",
            TenureGroup::OneToTwoYears => "1-2yr",
            TenureGroup::TwoToFourYears => "2-4yr",
            TenureGroup::OverFourYears => "4+yr",
        }
    }
}

/// Total charges spread over tenure. The `+ 1` keeps new customers
/// (tenure 0) defined.
pub fn avg_charge_per_month(total_charges: f64, tenure: u32) -> f64 {
    total_charges / (f64::from(tenure) + 1.0)
}

/// Count subscribed services: phone, internet (any kind) and each add-on
/// marked `Yes`.
pub fn num_services(record: &CustomerRecord) -> u32 {
    let mut count = 0;
    if record.phone_service.is_yes() {
        count += 1;
    }
    if record.internet_service.is_present() {
        count += 1;
    }
    count += record
        .add_ons()
        .iter()
        .filter(|(_, value)| *value == AddOn::Yes)
        .count() as u32;
    count
}

fn flag(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

/// Model input row with one named field per training column.
///
/// Field order follows `FEATURE_NAMES`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub senior_citizen: f64,
    pub partner: f64,
    pub dependents: f64,
    pub tenure: f64,
    pub phone_service: f64,
    pub paperless_billing: f64,
    pub monthly_charges: f64,
    pub total_charges: f64,
    pub avg_charge_per_month: f64,
    pub num_services: f64,

    pub gender_male: f64,
    pub multiple_lines_no_phone_service: f64,
    pub multiple_lines_yes: f64,
    pub internet_service_fiber_optic: f64,
    pub internet_service_no: f64,
    pub online_security_no_internet_service: f64,
    pub online_security_yes: f64,
    pub online_backup_no_internet_service: f64,
    pub online_backup_yes: f64,
    pub device_protection_no_internet_service: f64,
    pub device_protection_yes: f64,
    pub tech_support_no_internet_service: f64,
    pub tech_support_yes: f64,
    pub streaming_tv_no_internet_service: f64,
    pub streaming_tv_yes: f64,
    pub streaming_movies_no_internet_service: f64,
    pub streaming_movies_yes: f64,
    pub contract_one_year: f64,
    pub contract_two_year: f64,
    pub payment_method_credit_card: f64,
    pub payment_method_electronic_check: f64,
    pub payment_method_mailed_check: f64,
    pub tenure_group_1_2yr: f64,
    pub tenure_group_2_4yr: f64,
    pub tenure_group_4plus_yr: f64,
}

impl FeatureVector {
    /// Values in training column order.
    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.senior_citizen,
            self.partner,
            self.dependents,
            self.tenure,
            self.phone_service,
            self.paperless_billing,
            self.monthly_charges,
            self.total_charges,
            self.avg_charge_per_month,
            self.num_services,
            self.gender_male,
            self.multiple_lines_no_phone_service,
            self.multiple_lines_yes,
            self.internet_service_fiber_optic,
            self.internet_service_no,
            self.online_security_no_internet_service,
            self.online_security_yes,
            self.online_backup_no_internet_service,
            self.online_backup_yes,
            self.device_protection_no_internet_service,
            self.device_protection_yes,
            self.tech_support_no_internet_service,
            self.tech_support_yes,
            self.streaming_tv_no_internet_service,
            self.streaming_tv_yes,
            self.streaming_movies_no_internet_service,
            self.streaming_movies_yes,
            self.contract_one_year,
            self.contract_two_year,
            self.payment_method_credit_card,
            self.payment_method_electronic_check,
            self.payment_method_mailed_check,
            self.tenure_group_1_2yr,
            self.tenure_group_2_4yr,
            self.tenure_group_4plus_yr,
        ]
    }

    /// Values as the f32 row fed to ONNX models.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.values().iter().map(|&v| v as f32).collect()
    }

    /// Look up a value by training column name.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|index| self.values()[index])
    }

    /// Iterate `(name, value)` pairs in training order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.values())
    }

    pub fn scaled_mut(&mut self, column: ScaledColumn) -> &mut f64 {
        match column {
            ScaledColumn::Tenure => &mut self.tenure,
            ScaledColumn::MonthlyCharges => &mut self.monthly_charges,
            ScaledColumn::TotalCharges => &mut self.total_charges,
            ScaledColumn::AvgChargePerMonth => &mut self.avg_charge_per_month,
            ScaledColumn::NumServices => &mut self.num_services,
        }
    }
}

/// Encoder that turns customer records into model input features.
///
/// Holds the scaler fitted at training time; scaling parameters are never
/// derived from the record being encoded.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    scaler: StandardScaler,
}

impl FeatureEncoder {
    pub fn new(scaler: StandardScaler) -> Self {
        Self { scaler }
    }

    /// Encode a record and apply the fitted scaling.
    pub fn encode(&self, record: &CustomerRecord) -> FeatureVector {
        let mut features = Self::encode_raw(record);
        self.scaler.transform(&mut features);
        features
    }

    /// Encode a record without scaling.
    ///
    /// Does not check the service sentinel constraints; callers validate first.
    pub fn encode_raw(record: &CustomerRecord) -> FeatureVector {
        let tenure_group = TenureGroup::from_tenure(record.tenure);

        FeatureVector {
            senior_citizen: flag(record.senior_citizen == YesNo::Yes),
            partner: flag(record.partner == YesNo::Yes),
            dependents: flag(record.dependents == YesNo::Yes),
            tenure: f64::from(record.tenure),
            phone_service: flag(record.phone_service == YesNo::Yes),
            paperless_billing: flag(record.paperless_billing == YesNo::Yes),
            monthly_charges: record.monthly_charges,
            total_charges: record.total_charges,
            avg_charge_per_month: avg_charge_per_month(record.total_charges, record.tenure),
            num_services: f64::from(num_services(record)),

            gender_male: flag(record.gender == Gender::Male),
            multiple_lines_no_phone_service: flag(
                record.multiple_lines == PhoneLines::NoPhoneService,
            ),
            multiple_lines_yes: flag(record.multiple_lines == PhoneLines::Yes),
            internet_service_fiber_optic: flag(
                record.internet_service == InternetService::FiberOptic,
            ),
            internet_service_no: flag(record.internet_service == InternetService::No),
            online_security_no_internet_service: flag(
                record.online_security == AddOn::NoInternetService,
            ),
            online_security_yes: flag(record.online_security == AddOn::Yes),
            online_backup_no_internet_service: flag(
                record.online_backup == AddOn::NoInternetService,
            ),
            online_backup_yes: flag(record.online_backup == AddOn::Yes),
            device_protection_no_internet_service: flag(
                record.device_protection == AddOn::NoInternetService,
            ),
            device_protection_yes: flag(record.device_protection == AddOn::Yes),
            tech_support_no_internet_service: flag(
                record.tech_support == AddOn::NoInternetService,
            ),
            tech_support_yes: flag(record.tech_support == AddOn::Yes),
            streaming_tv_no_internet_service: flag(
                record.streaming_tv == AddOn::NoInternetService,
            ),
            streaming_tv_yes: flag(record.streaming_tv == AddOn::Yes),
            streaming_movies_no_internet_service: flag(
                record.streaming_movies == AddOn::NoInternetService,
            ),
            streaming_movies_yes: flag(record.streaming_movies == AddOn::Yes),
            contract_one_year: flag(record.contract == Contract::OneYear),
            contract_two_year: flag(record.contract == Contract::TwoYear),
            payment_method_credit_card: flag(record.payment_method == PaymentMethod::CreditCard),
            payment_method_electronic_check: flag(
                record.payment_method == PaymentMethod::ElectronicCheck,
            ),
            payment_method_mailed_check: flag(record.payment_method == PaymentMethod::MailedCheck),
            tenure_group_1_2yr: flag(tenure_group == TenureGroup::OneToTwoYears),
            tenure_group_2_4yr: flag(tenure_group == TenureGroup::TwoToFourYears),
            tenure_group_4plus_yr: flag(tenure_group == TenureGroup::OverFourYears),
        }
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }
}
