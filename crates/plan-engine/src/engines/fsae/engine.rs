use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::domain::{AccountType, AccountTypeId, FilingStatus, SavingsConfig};
use super::validation;
use crate::engines::money::round_cents;
use crate::engines::ConfigurationError;

/// Call errors for the savings estimator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EstimateError {
    #[error("unknown account type '{0}'")]
    UnknownAccountType(String),
    #[error("unknown filing status '{0}'")]
    UnknownFilingStatus(String),
}

/// Either a single annual cost or a sequence to accumulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Costs {
    One(f64),
    Many(Vec<f64>),
}

impl Costs {
    pub fn total(&self) -> f64 {
        match self {
            Costs::One(cost) => *cost,
            Costs::Many(costs) => costs.iter().sum(),
        }
    }
}

/// Savings estimate request. Empty `accountTypeId` selects the first
/// configured account type; empty `filingStatusId` defaults to single.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsEstimateRequest {
    #[serde(default)]
    pub account_type_id: String,
    #[serde(default)]
    pub filing_status_id: String,
    #[serde(default)]
    pub number_of_dependents: u32,
    pub primary_annual_income: f64,
    #[serde(default)]
    pub spouse_annual_income: f64,
    #[serde(default)]
    pub rollover_amount: f64,
    pub costs: Costs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsEstimate {
    pub account_type_id: AccountTypeId,
    pub account_type_description: String,
    pub total_costs: f64,
    pub suggested_contribution: f64,
    pub employer_matching_contribution: f64,
    pub federal_income_tax_savings: f64,
    pub fica_tax_savings: f64,
    pub total_tax_savings: f64,
    pub total_match_and_tax_savings: f64,
    pub elapsed_msec: f64,
}

/// A contribution proposal before tax effects are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContributionSuggestion {
    pub suggested: f64,
    pub employer_match: f64,
}

/// Sizes a pre-tax contribution for a target cost and computes the federal
/// income tax and FICA payroll deltas from the configured schedule.
#[derive(Debug)]
pub struct SavingsEstimator {
    config: Arc<SavingsConfig>,
}

impl SavingsEstimator {
    pub fn new(config: Arc<SavingsConfig>) -> Result<Self, ConfigurationError> {
        validation::validate(&config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SavingsConfig {
        &self.config
    }

    /// Propose a contribution honoring the account's minimum, maximum, and
    /// employer-match caps. The two candidates keep the combined
    /// household-plus-match payment from overshooting either the combined
    /// cap or the match cap.
    pub fn contributions(
        &self,
        account: &AccountType,
        total_cost: f64,
        rollover: f64,
    ) -> ContributionSuggestion {
        if total_cost == 0.0 {
            return ContributionSuggestion {
                suggested: 0.0,
                employer_match: 0.0,
            };
        }

        let remaining = (total_cost - rollover).max(0.0);
        let limited = account.contribution_maximum.min(remaining);
        let suggested = account
            .contribution_minimum
            .max((limited / (1.0 + account.employer_match_rate))
                .max(limited - account.employer_max_match_amount));
        let suggested = round_cents(suggested);
        let employer_match = round_cents(
            account
                .employer_max_match_amount
                .min(suggested * account.employer_match_rate),
        );

        ContributionSuggestion {
            suggested,
            employer_match,
        }
    }

    /// Federal income tax from the bracketed schedule. Taxable income may
    /// go negative; the result is then proportionally negative (a refund
    /// credit) rather than clamped.
    pub fn federal_income_tax(
        &self,
        income: f64,
        filing_status: FilingStatus,
        dependents: u32,
    ) -> f64 {
        let table = &self.config.tax.filing_statuses[&filing_status];
        let taxable = income
            - table.personal_exemption
            - table.dependent_exemption * f64::from(dependents)
            - table.standard_deduction;

        let mut tax = 0.0;
        let mut taxed_so_far = 0.0;
        for bracket in &table.brackets {
            let upper = bracket.up_to.unwrap_or(f64::INFINITY);
            let slice = taxable.min(upper) - taxed_so_far;
            tax += slice * bracket.rate;
            taxed_so_far = taxable.min(upper);
            if taxable <= upper {
                break;
            }
        }
        tax
    }

    /// Social security (capped) plus medicare (uncapped) payroll taxes.
    pub fn fica_payroll_taxes(&self, income: f64) -> f64 {
        let fica = &self.config.tax.fica;
        income.min(fica.social_security_limit) * fica.social_security_rate
            + income * fica.medicare_rate
    }

    pub fn calculate(
        &self,
        request: &SavingsEstimateRequest,
    ) -> Result<SavingsEstimate, EstimateError> {
        let started = Instant::now();

        let account_type_id = if request.account_type_id.is_empty() {
            self.config.account_types_order[0].clone()
        } else {
            let id = AccountTypeId::new(request.account_type_id.clone());
            if !self.config.account_types.contains_key(&id) {
                return Err(EstimateError::UnknownAccountType(
                    request.account_type_id.clone(),
                ));
            }
            id
        };
        let account = &self.config.account_types[&account_type_id];

        let filing_status = if request.filing_status_id.is_empty() {
            FilingStatus::Single
        } else {
            FilingStatus::parse(&request.filing_status_id).ok_or_else(|| {
                EstimateError::UnknownFilingStatus(request.filing_status_id.clone())
            })?
        };

        let total_costs = round_cents(request.costs.total());
        let contribution =
            self.contributions(account, total_costs, request.rollover_amount);

        let taxable_household_income = request.primary_annual_income
            + if filing_status == FilingStatus::MarriedFilingJoint {
                request.spouse_annual_income
            } else {
                0.0
            };

        let federal_income_tax_savings = round_cents(
            self.federal_income_tax(
                taxable_household_income,
                filing_status,
                request.number_of_dependents,
            ) - self.federal_income_tax(
                taxable_household_income - contribution.suggested,
                filing_status,
                request.number_of_dependents,
            ),
        );
        let fica_tax_savings = round_cents(
            self.fica_payroll_taxes(request.primary_annual_income)
                - self.fica_payroll_taxes(
                    request.primary_annual_income - contribution.suggested,
                ),
        );

        let total_tax_savings = round_cents(federal_income_tax_savings + fica_tax_savings);
        let total_match_and_tax_savings =
            round_cents(total_tax_savings + contribution.employer_match);

        let elapsed_msec = started.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(
            account_type = %account_type_id,
            filing_status = %filing_status,
            total_costs,
            elapsed_msec,
            "savings estimate complete"
        );

        Ok(SavingsEstimate {
            account_type_description: account.description.resolve().to_string(),
            account_type_id,
            total_costs,
            suggested_contribution: contribution.suggested,
            employer_matching_contribution: contribution.employer_match,
            federal_income_tax_savings,
            fica_tax_savings,
            total_tax_savings,
            total_match_and_tax_savings,
            elapsed_msec,
        })
    }
}
