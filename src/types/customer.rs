//! Customer attribute record collected by the input form

use crate::error::RecordError;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Upper bound of the tenure slider, in months.
pub const MAX_TENURE: u32 = 72;
/// Upper bound of the monthly charges input.
pub const MAX_MONTHLY_CHARGES: f64 = 150.0;
/// Upper bound of the total charges input.
pub const MAX_TOTAL_CHARGES: f64 = 10_000.0;

/// A categorical input with a fixed set of levels.
///
/// `label` is the exact level string used in the training data.
pub trait Choice: Copy + Sized + 'static {
    const OPTIONS: &'static [Self];

    fn label(self) -> &'static str;
}

macro_rules! impl_display_via_label {
    ($($ty:ty),+) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })+
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Choice for Gender {
    const OPTIONS: &'static [Self] = &[Gender::Male, Gender::Female];

    fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    No,
    Yes,
}

impl YesNo {
    pub fn is_yes(self) -> bool {
        self == YesNo::Yes
    }
}

impl Choice for YesNo {
    const OPTIONS: &'static [Self] = &[YesNo::No, YesNo::Yes];

    fn label(self) -> &'static str {
        match self {
            YesNo::No => "No",
            YesNo::Yes => "Yes",
        }
    }
}

/// Multiple lines, with the sentinel used when there is no phone service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhoneLines {
    No,
    Yes,
    #[serde(rename = "No phone service")]
    NoPhoneService,
}

impl Choice for PhoneLines {
    const OPTIONS: &'static [Self] = &[PhoneLines::No, PhoneLines::Yes, PhoneLines::NoPhoneService];

    fn label(self) -> &'static str {
        match self {
            PhoneLines::No => "No",
            PhoneLines::Yes => "Yes",
            PhoneLines::NoPhoneService => "No phone service",
        }
    }
}

impl From<YesNo> for PhoneLines {
    fn from(value: YesNo) -> Self {
        match value {
            YesNo::No => PhoneLines::No,
            YesNo::Yes => PhoneLines::Yes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InternetService {
    No,
    #[serde(rename = "DSL")]
    Dsl,
    #[serde(rename = "Fiber optic")]
    FiberOptic,
}

impl InternetService {
    pub fn is_present(self) -> bool {
        self != InternetService::No
    }
}

impl Choice for InternetService {
    const OPTIONS: &'static [Self] = &[
        InternetService::No,
        InternetService::Dsl,
        InternetService::FiberOptic,
    ];

    fn label(self) -> &'static str {
        match self {
            InternetService::No => "No",
            InternetService::Dsl => "DSL",
            InternetService::FiberOptic => "Fiber optic",
        }
    }
}

/// An internet add-on, with the sentinel used when there is no internet service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddOn {
    No,
    Yes,
    #[serde(rename = "No internet service")]
    NoInternetService,
}

impl Choice for AddOn {
    const OPTIONS: &'static [Self] = &[AddOn::No, AddOn::Yes, AddOn::NoInternetService];

    fn label(self) -> &'static str {
        match self {
            AddOn::No => "No",
            AddOn::Yes => "Yes",
            AddOn::NoInternetService => "No internet service",
        }
    }
}

impl From<YesNo> for AddOn {
    fn from(value: YesNo) -> Self {
        match value {
            YesNo::No => AddOn::No,
            YesNo::Yes => AddOn::Yes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contract {
    #[serde(rename = "Month-to-month")]
    MonthToMonth,
    #[serde(rename = "One year")]
    OneYear,
    #[serde(rename = "Two year")]
    TwoYear,
}

impl Choice for Contract {
    const OPTIONS: &'static [Self] =
        &[Contract::MonthToMonth, Contract::OneYear, Contract::TwoYear];

    fn label(self) -> &'static str {
        match self {
            Contract::MonthToMonth => "Month-to-month",
            Contract::OneYear => "One year",
            Contract::TwoYear => "Two year",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Electronic check")]
    ElectronicCheck,
    #[serde(rename = "Mailed check")]
    MailedCheck,
    #[serde(rename = "Bank transfer (automatic)")]
    BankTransfer,
    #[serde(rename = "Credit card (automatic)")]
    CreditCard,
}

impl Choice for PaymentMethod {
    const OPTIONS: &'static [Self] = &[
        PaymentMethod::ElectronicCheck,
        PaymentMethod::MailedCheck,
        PaymentMethod::BankTransfer,
        PaymentMethod::CreditCard,
    ];

    fn label(self) -> &'static str {
        match self {
            PaymentMethod::ElectronicCheck => "Electronic check",
            PaymentMethod::MailedCheck => "Mailed check",
            PaymentMethod::BankTransfer => "Bank transfer (automatic)",
            PaymentMethod::CreditCard => "Credit card (automatic)",
        }
    }
}

impl_display_via_label!(Gender, YesNo, PhoneLines, InternetService, AddOn, Contract, PaymentMethod);

/// Telecom customer attributes, one per prediction request.
///
/// Field aliases accept the column names of the training dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub gender: Gender,

    /// Also accepts the dataset's 0/1 encoding
    #[serde(alias = "SeniorCitizen", deserialize_with = "yes_no_or_flag")]
    pub senior_citizen: YesNo,

    #[serde(alias = "Partner")]
    pub partner: YesNo,

    #[serde(alias = "Dependents")]
    pub dependents: YesNo,

    /// Months with the company, 0..=72
    pub tenure: u32,

    #[serde(alias = "PhoneService")]
    pub phone_service: YesNo,

    #[serde(alias = "MultipleLines")]
    pub multiple_lines: PhoneLines,

    #[serde(alias = "InternetService")]
    pub internet_service: InternetService,

    #[serde(alias = "OnlineSecurity")]
    pub online_security: AddOn,

    #[serde(alias = "OnlineBackup")]
    pub online_backup: AddOn,

    #[serde(alias = "DeviceProtection")]
    pub device_protection: AddOn,

    #[serde(alias = "TechSupport")]
    pub tech_support: AddOn,

    #[serde(alias = "StreamingTV")]
    pub streaming_tv: AddOn,

    #[serde(alias = "StreamingMovies")]
    pub streaming_movies: AddOn,

    #[serde(alias = "Contract")]
    pub contract: Contract,

    #[serde(alias = "PaperlessBilling")]
    pub paperless_billing: YesNo,

    #[serde(alias = "PaymentMethod")]
    pub payment_method: PaymentMethod,

    #[serde(alias = "MonthlyCharges")]
    pub monthly_charges: f64,

    #[serde(alias = "TotalCharges")]
    pub total_charges: f64,
}

impl CustomerRecord {
    /// The six add-ons that require internet service, with their field names.
    pub fn add_ons(&self) -> [(&'static str, AddOn); 6] {
        [
            ("online_security", self.online_security),
            ("online_backup", self.online_backup),
            ("device_protection", self.device_protection),
            ("tech_support", self.tech_support),
            ("streaming_tv", self.streaming_tv),
            ("streaming_movies", self.streaming_movies),
        ]
    }

    /// Check input ranges and the service sentinel constraints.
    ///
    /// `multiple_lines` must be `No phone service` exactly when phone service
    /// is absent; each add-on must be `No internet service` exactly when
    /// internet service is absent.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.tenure > MAX_TENURE {
            return Err(RecordError::TenureOutOfRange {
                value: self.tenure,
                max: MAX_TENURE,
            });
        }
        check_charge("monthly_charges", self.monthly_charges, MAX_MONTHLY_CHARGES)?;
        check_charge("total_charges", self.total_charges, MAX_TOTAL_CHARGES)?;

        let lines_sentinel = self.multiple_lines == PhoneLines::NoPhoneService;
        if lines_sentinel == self.phone_service.is_yes() {
            return Err(RecordError::PhoneLinesMismatch {
                phone_service: self.phone_service,
                multiple_lines: self.multiple_lines,
            });
        }

        for (field, value) in self.add_ons() {
            let add_on_sentinel = value == AddOn::NoInternetService;
            if add_on_sentinel == self.internet_service.is_present() {
                return Err(RecordError::AddOnMismatch {
                    field,
                    value,
                    internet_service: self.internet_service,
                });
            }
        }

        Ok(())
    }
}

/// `"Yes"`/`"No"`, or `1`/`0` as the raw dataset stores `SeniorCitizen`.
fn yes_no_or_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<YesNo, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Label(YesNo),
        Flag(u8),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Label(value) => Ok(value),
        Raw::Flag(0) => Ok(YesNo::No),
        Raw::Flag(1) => Ok(YesNo::Yes),
        Raw::Flag(n) => Err(D::Error::custom(format!(
            "senior_citizen flag must be 0 or 1, got {n}"
        ))),
    }
}

fn check_charge(field: &'static str, value: f64, max: f64) -> Result<(), RecordError> {
    if value.is_finite() && (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(RecordError::ChargeOutOfRange { field, value, max })
    }
}

/// Raw submission of the HTML form.
///
/// Dependent selects are optional: the page hides them when phone or
/// internet service is absent, and `into_record` fixes them to the sentinel
/// in that case, whatever was submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerForm {
    pub gender: Gender,
    pub senior_citizen: YesNo,
    pub partner: YesNo,
    pub dependents: YesNo,
    pub tenure: u32,
    pub contract: Contract,
    pub paperless_billing: YesNo,
    pub payment_method: PaymentMethod,
    pub phone_service: YesNo,
    pub multiple_lines: Option<YesNo>,
    pub internet_service: InternetService,
    pub online_security: Option<YesNo>,
    pub online_backup: Option<YesNo>,
    pub device_protection: Option<YesNo>,
    pub tech_support: Option<YesNo>,
    pub streaming_tv: Option<YesNo>,
    pub streaming_movies: Option<YesNo>,
    pub monthly_charges: f64,
    pub total_charges: f64,
}

impl CustomerForm {
    /// Build a record, applying the sentinel levels for absent services.
    ///
    /// A dependent select left out while its service is present counts as `No`.
    pub fn into_record(self) -> CustomerRecord {
        let multiple_lines = if self.phone_service.is_yes() {
            PhoneLines::from(self.multiple_lines.unwrap_or(YesNo::No))
        } else {
            PhoneLines::NoPhoneService
        };

        let has_internet = self.internet_service.is_present();
        let add_on = |value: Option<YesNo>| {
            if has_internet {
                AddOn::from(value.unwrap_or(YesNo::No))
            } else {
                AddOn::NoInternetService
            }
        };

        CustomerRecord {
            gender: self.gender,
            senior_citizen: self.senior_citizen,
            partner: self.partner,
            dependents: self.dependents,
            tenure: self.tenure,
            phone_service: self.phone_service,
            multiple_lines,
            internet_service: self.internet_service,
            online_security: add_on(self.online_security),
            online_backup: add_on(self.online_backup),
            device_protection: add_on(self.device_protection),
            tech_support: add_on(self.tech_support),
            streaming_tv: add_on(self.streaming_tv),
            streaming_movies: add_on(self.streaming_movies),
            contract: self.contract,
            paperless_billing: self.paperless_billing,
            payment_method: self.payment_method,
            monthly_charges: self.monthly_charges,
            total_charges: self.total_charges,
        }
    }
}

impl Default for CustomerRecord {
    /// The form's initial state: 12 months tenure, $70 monthly, $500 total.
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            senior_citizen: YesNo::No,
            partner: YesNo::No,
            dependents: YesNo::No,
            tenure: 12,
            phone_service: YesNo::No,
            multiple_lines: PhoneLines::NoPhoneService,
            internet_service: InternetService::No,
            online_security: AddOn::NoInternetService,
            online_backup: AddOn::NoInternetService,
            device_protection: AddOn::NoInternetService,
            tech_support: AddOn::NoInternetService,
            streaming_tv: AddOn::NoInternetService,
            streaming_movies: AddOn::NoInternetService,
            contract: Contract::MonthToMonth,
            paperless_billing: YesNo::No,
            payment_method: PaymentMethod::ElectronicCheck,
            monthly_charges: 70.0,
            total_charges: 500.0,
        }
    }
}
