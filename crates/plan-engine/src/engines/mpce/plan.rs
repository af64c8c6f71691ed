//! Evaluates one plan for a whole household: builds the running budgets,
//! drives the rule evaluator over every member and service in the marker's
//! deductible-first order, then applies the fund offset and the premium.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::amounts::{resolve_amount, resolve_premium};
use super::budgets::BudgetScope;
use super::domain::{
    CoverageLevelId, GroupId, LimitGroup, PlanId, RegionId, StatusId,
    ADDITIONAL_SERVICES_PREFIX,
};
use super::household::Household;
use super::markup::PreparedCatalog;
use super::rules::{apply_rule, GroupBindings};
use crate::engines::money::round_cents;

/// Counts smaller than this are treated as fully consumed; guards the
/// fractional-unit arithmetic dollar limits introduce.
const COUNT_EPSILON: f64 = 1e-9;

/// Caller-supplied per-plan adjustments: prior-year fund rollover, the
/// member's planned contribution, a payroll premium adjustment, and any
/// extra employer match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanInputs {
    pub rollover_amount: f64,
    pub voluntary_contribution: f64,
    pub premium_adjustment_amount: f64,
    pub additional_match_amount: f64,
}

/// Year-end totals for one plan, all rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub plan_id: PlanId,
    pub description: String,
    pub total_raw_expenses: f64,
    pub total_deductibles: f64,
    pub total_copays: f64,
    pub total_coinsurance: f64,
    pub total_expenses_not_covered: f64,
    pub total_employer_or_plan_paid_excluding_fund: f64,
    pub total_fund_eligible_costs: f64,
    pub plan_fund_amount: f64,
    pub total_fund_amount_offset: f64,
    pub plan_fund_paid: f64,
    pub plan_fund_additional_match_paid: f64,
    pub rollover_fund_paid: f64,
    pub voluntary_fund_paid: f64,
    pub fund_carryover_balance: f64,
    pub total_medical_and_drug_costs_excluding_deductibles: f64,
    pub total_medical_and_drug_costs: f64,
    pub total_medical_and_drug_costs_less_fund_offset: f64,
    pub annual_premium: f64,
    pub total_annual_payroll_contributions: f64,
    pub total_care_and_payroll_contributions: f64,
    pub total_current_year_fund_contributions: f64,
    pub total_annual_cost: f64,
}

pub(crate) fn evaluate_plan(
    prepared: &PreparedCatalog,
    plan_id: &PlanId,
    region_id: &RegionId,
    status_id: &StatusId,
    coverage_level_id: &CoverageLevelId,
    household: &Household,
    inputs: &PlanInputs,
) -> PlanResult {
    let catalog = prepared.catalog();
    let plan = &catalog.plans[plan_id];
    let tables = prepared.plan_tables(plan_id);

    let mut family = BudgetScope::default();
    seed_limit_groups(
        &mut family,
        plan.family_deductibles.as_ref(),
        region_id,
        status_id,
        coverage_level_id,
        BudgetScope::set_deductible,
    );
    seed_limit_groups(
        &mut family,
        plan.family_out_of_pocket_maximums.as_ref(),
        region_id,
        status_id,
        coverage_level_id,
        BudgetScope::set_oop_maximum,
    );

    let mut person_template = BudgetScope::default();
    seed_limit_groups(
        &mut person_template,
        plan.person_deductibles.as_ref(),
        region_id,
        status_id,
        coverage_level_id,
        BudgetScope::set_deductible,
    );
    seed_limit_groups(
        &mut person_template,
        plan.person_out_of_pocket_maximums.as_ref(),
        region_id,
        status_id,
        coverage_level_id,
        BudgetScope::set_oop_maximum,
    );

    for (limit_id, limit) in &catalog.combined_limits {
        if let Some(cap) = limit.person_reimburse_limit {
            person_template.set_combined_limit(limit_id.clone(), cap);
        }
        if let Some(cap) = limit.family_reimburse_limit {
            family.set_combined_limit(limit_id.clone(), cap);
        }
    }

    let mut total_raw = 0.0;
    let mut total_deductibles = 0.0;
    let mut total_copays = 0.0;
    let mut total_coinsurance = 0.0;
    let mut total_not_covered = 0.0;
    let mut fund_eligible = 0.0;

    for utilization in household.members() {
        let mut person = person_template.clone();

        for service_id in tables
            .services_with_deductible
            .iter()
            .chain(tables.services_no_deductible.iter())
        {
            let raw_count = utilization.get(service_id).copied().unwrap_or(0);
            if raw_count == 0 {
                continue;
            }
            let service = &catalog.services[service_id];
            let table_cost = service.cost_tables[&tables.costs_object_id][region_id];

            // Additional-spend pseudo services carry raw dollars in the
            // count field: one event costing the entered amount.
            let (mut remaining, cost) =
                if service_id.as_str().starts_with(ADDITIONAL_SERVICES_PREFIX)
                    && table_cost == 1.0
                {
                    (1.0, f64::from(raw_count))
                } else {
                    (f64::from(raw_count), table_cost)
                };

            total_raw += round_cents(remaining * cost);

            let category_id = prepared.service_category(service_id);
            let bindings = GroupBindings {
                person_deductible: &tables.person_deductible_group[category_id],
                family_deductible: &tables.family_deductible_group[category_id],
                person_oop: &tables.person_oop_group[category_id],
                family_oop: &tables.family_oop_group[category_id],
            };

            let rules = &tables.coverage[service_id];
            let mut last_rule_eligible = false;

            for rule in rules {
                if remaining <= COUNT_EPSILON {
                    break;
                }
                last_rule_eligible = rule.eligible_for_fund();

                let outcome = apply_rule(rule, remaining, cost, &bindings, &mut person, &mut family);
                total_deductibles += outcome.deductibles;
                total_copays += outcome.copays;
                total_coinsurance += outcome.coinsurance;
                total_not_covered += outcome.expenses_not_covered;
                if rule.eligible_for_fund() {
                    fund_eligible += outcome.deductibles
                        + outcome.copays
                        + outcome.coinsurance
                        + outcome.expenses_not_covered;
                }
                remaining -= outcome.units_disposed;

                if outcome.limit_attained {
                    break;
                }
            }

            // Units no rule claimed (a sequence that ran dry, or one cut
            // short by a combined limit) are expenses the member carries.
            if remaining > COUNT_EPSILON {
                let leftover = round_cents(remaining * cost);
                total_not_covered += leftover;
                if last_rule_eligible {
                    fund_eligible += leftover;
                }
            }
        }
    }

    let total_raw = round_cents(total_raw);
    let total_deductibles = round_cents(total_deductibles);
    let total_copays = round_cents(total_copays);
    let total_coinsurance = round_cents(total_coinsurance);
    let total_not_covered = round_cents(total_not_covered);
    let fund_eligible = round_cents(fund_eligible);

    let plan_fund = plan
        .fund_amount_map
        .as_ref()
        .and_then(|map| resolve_amount(map, region_id, status_id, coverage_level_id))
        .unwrap_or(0.0);

    let sources = [
        plan_fund,
        inputs.additional_match_amount,
        inputs.rollover_amount,
        inputs.voluntary_contribution,
    ];
    let fund_available: f64 = sources.iter().sum();
    let fund_offset = round_cents(fund_eligible.min(fund_available));

    let mut paid = [0.0; 4];
    let mut left_to_offset = fund_offset;
    for (slot, source) in paid.iter_mut().zip(sources) {
        let take = round_cents(left_to_offset.min(source));
        *slot = take;
        left_to_offset = round_cents(left_to_offset - take);
    }
    let [plan_fund_paid, additional_match_paid, rollover_fund_paid, voluntary_fund_paid] = paid;
    let fund_carryover_balance = round_cents(fund_available - fund_offset);

    let annual_premium = catalog
        .coverage_level_costs_per_plan
        .get(plan_id)
        .and_then(|table| resolve_premium(table, region_id, status_id, coverage_level_id))
        .unwrap_or(0.0);
    let payroll_contributions =
        round_cents((annual_premium + inputs.premium_adjustment_amount).max(0.0));

    let costs_excluding_deductibles =
        round_cents(total_copays + total_coinsurance + total_not_covered);
    let member_costs = round_cents(costs_excluding_deductibles + total_deductibles);
    let costs_less_fund_offset = round_cents(member_costs - fund_offset);
    let employer_or_plan_paid = round_cents(total_raw - member_costs);
    let care_and_payroll = round_cents(costs_less_fund_offset + payroll_contributions);
    let current_year_fund_contributions = round_cents(inputs.voluntary_contribution);
    let total_annual_cost = round_cents(care_and_payroll + current_year_fund_contributions);

    PlanResult {
        plan_id: plan_id.clone(),
        description: plan.description.resolve().to_string(),
        total_raw_expenses: total_raw,
        total_deductibles,
        total_copays,
        total_coinsurance,
        total_expenses_not_covered: total_not_covered,
        total_employer_or_plan_paid_excluding_fund: employer_or_plan_paid,
        total_fund_eligible_costs: fund_eligible,
        plan_fund_amount: round_cents(plan_fund),
        total_fund_amount_offset: fund_offset,
        plan_fund_paid,
        plan_fund_additional_match_paid: additional_match_paid,
        rollover_fund_paid,
        voluntary_fund_paid,
        fund_carryover_balance,
        total_medical_and_drug_costs_excluding_deductibles: costs_excluding_deductibles,
        total_medical_and_drug_costs: member_costs,
        total_medical_and_drug_costs_less_fund_offset: costs_less_fund_offset,
        annual_premium: round_cents(annual_premium),
        total_annual_payroll_contributions: payroll_contributions,
        total_care_and_payroll_contributions: care_and_payroll,
        total_current_year_fund_contributions: current_year_fund_contributions,
        total_annual_cost,
    }
}

fn seed_limit_groups(
    scope: &mut BudgetScope,
    groups: Option<&BTreeMap<GroupId, LimitGroup>>,
    region_id: &RegionId,
    status_id: &StatusId,
    coverage_level_id: &CoverageLevelId,
    set: impl Fn(&mut BudgetScope, GroupId, f64),
) {
    let Some(groups) = groups else { return };
    for (group_id, group) in groups {
        let cap = match (group.amount, &group.amount_map) {
            (Some(amount), _) => Some(amount),
            (None, Some(map)) => resolve_amount(map, region_id, status_id, coverage_level_id),
            (None, None) => None,
        };
        // Validation guarantees resolution; an unresolvable group would
        // otherwise behave as unlimited.
        if let Some(cap) = cap {
            set(scope, group_id.clone(), cap);
        }
    }
}
