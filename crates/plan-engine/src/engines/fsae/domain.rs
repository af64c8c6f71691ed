use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engines::mpce::domain::Text;

/// Identifier wrapper for pre-tax account types.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountTypeId(pub String);

impl AccountTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountTypeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A flexible spending or health savings account type and its contribution
/// and employer-match limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountType {
    pub description: Text,
    pub contribution_minimum: f64,
    pub contribution_maximum: f64,
    pub employer_match_rate: f64,
    pub employer_max_match_amount: f64,
}

/// Federal filing status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum FilingStatus {
    Single,
    MarriedFilingJoint,
    MarriedFilingSeparate,
    HeadOfHousehold,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 4] = [
        FilingStatus::Single,
        FilingStatus::MarriedFilingJoint,
        FilingStatus::MarriedFilingSeparate,
        FilingStatus::HeadOfHousehold,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::MarriedFilingJoint => "marriedFilingJoint",
            FilingStatus::MarriedFilingSeparate => "marriedFilingSeparate",
            FilingStatus::HeadOfHousehold => "headOfHousehold",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One marginal bracket. `up_to` of `None` marks the open-ended top
/// bracket; income above the last bounded bracket is taxed at that final
/// rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_to: Option<f64>,
    pub rate: f64,
}

/// Exemptions, the standard deduction, and the bracket ladder for one
/// filing status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingStatusTable {
    pub personal_exemption: f64,
    pub dependent_exemption: f64,
    pub standard_deduction: f64,
    pub brackets: Vec<TaxBracket>,
}

/// FICA payroll tax parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollTax {
    pub social_security_limit: f64,
    pub social_security_rate: f64,
    pub medicare_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSchedule {
    pub filing_statuses: BTreeMap<FilingStatus, FilingStatusTable>,
    pub fica: PayrollTax,
}

/// Full estimator configuration: account types (in display order) and the
/// tax schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsConfig {
    pub account_types: BTreeMap<AccountTypeId, AccountType>,
    pub account_types_order: Vec<AccountTypeId>,
    pub tax: TaxSchedule,
}
