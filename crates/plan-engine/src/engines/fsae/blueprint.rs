//! Built-in estimator configuration: an FSA and a matched HSA against the
//! 2017 federal schedule.

use std::collections::BTreeMap;

use super::domain::{
    AccountType, AccountTypeId, FilingStatus, FilingStatusTable, PayrollTax, SavingsConfig,
    TaxBracket, TaxSchedule,
};
use crate::engines::mpce::domain::Text;

pub fn standard_savings_config() -> SavingsConfig {
    SavingsConfig {
        account_types: BTreeMap::from([
            (
                AccountTypeId::from("FSA"),
                AccountType {
                    description: Text::plain("Flexible spending account"),
                    contribution_minimum: 0.0,
                    contribution_maximum: 2600.0,
                    employer_match_rate: 0.0,
                    employer_max_match_amount: 0.0,
                },
            ),
            (
                AccountTypeId::from("HSA"),
                AccountType {
                    description: Text::plain("Health savings account"),
                    contribution_minimum: 0.0,
                    contribution_maximum: 3400.0,
                    employer_match_rate: 0.5,
                    employer_max_match_amount: 500.0,
                },
            ),
        ]),
        account_types_order: vec![AccountTypeId::from("FSA"), AccountTypeId::from("HSA")],
        tax: TaxSchedule {
            filing_statuses: BTreeMap::from([
                (
                    FilingStatus::Single,
                    table(
                        4050.0,
                        6350.0,
                        [9325.0, 37950.0, 91900.0, 191650.0, 416700.0, 418400.0],
                    ),
                ),
                (
                    FilingStatus::MarriedFilingJoint,
                    table(
                        8100.0,
                        12700.0,
                        [18650.0, 75900.0, 153100.0, 233350.0, 416700.0, 470700.0],
                    ),
                ),
                (
                    FilingStatus::MarriedFilingSeparate,
                    table(
                        4050.0,
                        6350.0,
                        [9325.0, 37950.0, 76550.0, 116675.0, 208350.0, 235350.0],
                    ),
                ),
                (
                    FilingStatus::HeadOfHousehold,
                    table(
                        4050.0,
                        9350.0,
                        [13350.0, 50800.0, 131200.0, 212500.0, 416700.0, 444550.0],
                    ),
                ),
            ]),
            fica: PayrollTax {
                social_security_limit: 200_000.0,
                social_security_rate: 0.062,
                medicare_rate: 0.0145,
            },
        },
    }
}

const RATES: [f64; 7] = [0.10, 0.15, 0.25, 0.28, 0.33, 0.35, 0.396];

fn table(personal_exemption: f64, standard_deduction: f64, uppers: [f64; 6]) -> FilingStatusTable {
    let mut brackets: Vec<TaxBracket> = uppers
        .into_iter()
        .zip(RATES)
        .map(|(upper, rate)| TaxBracket {
            up_to: Some(upper),
            rate,
        })
        .collect();
    brackets.push(TaxBracket {
        up_to: None,
        rate: RATES[6],
    });

    FilingStatusTable {
        personal_exemption,
        dependent_exemption: 4050.0,
        standard_deduction,
        brackets,
    }
}
