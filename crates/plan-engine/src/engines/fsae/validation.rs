//! Structural checks on the savings estimator configuration, reported the
//! same way as the plan catalog validator: every issue collected, then one
//! aggregated failure.

use std::collections::BTreeSet;

use super::domain::{FilingStatus, SavingsConfig};
use crate::engines::ConfigurationError;

pub fn validate(config: &SavingsConfig) -> Result<(), ConfigurationError> {
    let mut issues = Vec::new();

    if config.account_types.is_empty() {
        issues.push("accountTypes: at least one account type is required".to_string());
    }

    let ordered: BTreeSet<_> = config.account_types_order.iter().collect();
    if ordered.len() != config.account_types_order.len() {
        issues.push("accountTypesOrder: contains duplicate ids".to_string());
    }
    for id in &config.account_types_order {
        if !config.account_types.contains_key(id) {
            issues.push(format!("accountTypesOrder: unknown account type '{id}'"));
        }
    }
    for id in config.account_types.keys() {
        if !ordered.contains(id) {
            issues.push(format!(
                "accountTypes: id '{id}' is missing from accountTypesOrder"
            ));
        }
    }

    for (id, account) in &config.account_types {
        let context = format!("accountType '{id}'");
        for (field, value) in [
            ("contributionMinimum", account.contribution_minimum),
            ("contributionMaximum", account.contribution_maximum),
            ("employerMatchRate", account.employer_match_rate),
            ("employerMaxMatchAmount", account.employer_max_match_amount),
        ] {
            if value < 0.0 {
                issues.push(format!("{context}: {field} is negative"));
            }
        }
        if account.contribution_minimum > account.contribution_maximum {
            issues.push(format!(
                "{context}: contributionMinimum exceeds contributionMaximum"
            ));
        }
    }

    for status in FilingStatus::ALL {
        let Some(table) = config.tax.filing_statuses.get(&status) else {
            issues.push(format!("tax: missing filing status '{status}'"));
            continue;
        };
        let context = format!("tax '{status}'");

        for (field, value) in [
            ("personalExemption", table.personal_exemption),
            ("dependentExemption", table.dependent_exemption),
            ("standardDeduction", table.standard_deduction),
        ] {
            if value < 0.0 {
                issues.push(format!("{context}: {field} is negative"));
            }
        }

        if table.brackets.is_empty() {
            issues.push(format!("{context}: bracket ladder is empty"));
            continue;
        }
        let mut previous_upper = 0.0;
        for (index, bracket) in table.brackets.iter().enumerate() {
            if !(0.0..=1.0).contains(&bracket.rate) {
                issues.push(format!(
                    "{context}: bracket {index} rate must be within [0, 1]"
                ));
            }
            let is_last = index + 1 == table.brackets.len();
            match bracket.up_to {
                Some(upper) => {
                    if is_last {
                        issues.push(format!(
                            "{context}: the final bracket must be open-ended"
                        ));
                    }
                    if upper <= previous_upper {
                        issues.push(format!(
                            "{context}: bracket {index} upper bound does not increase"
                        ));
                    }
                    previous_upper = upper;
                }
                None => {
                    if !is_last {
                        issues.push(format!(
                            "{context}: only the final bracket may be open-ended"
                        ));
                    }
                }
            }
        }
    }

    let fica = &config.tax.fica;
    if fica.social_security_limit < 0.0 {
        issues.push("tax.fica: socialSecurityLimit is negative".to_string());
    }
    for (field, rate) in [
        ("socialSecurityRate", fica.social_security_rate),
        ("medicareRate", fica.medicare_rate),
    ] {
        if !(0.0..=1.0).contains(&rate) {
            issues.push(format!("tax.fica: {field} must be within [0, 1]"));
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ConfigurationError::from_issues(issues))
    }
}
