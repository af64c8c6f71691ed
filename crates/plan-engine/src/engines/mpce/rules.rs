//! Applies one coverage rule to one service event, unit by unit, updating
//! the shared person and family budgets. Total over validated input: every
//! draw is clamped by the budgets, so no intermediate can go negative.

use super::budgets::BudgetScope;
use super::domain::GroupId;
use super::markup::{ChargeRule, CoverageRule, DeductibleTiming};
use crate::engines::money::round_cents;

/// The limit groups a service's category maps to under the active plan.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GroupBindings<'a> {
    pub person_deductible: &'a GroupId,
    pub family_deductible: &'a GroupId,
    pub person_oop: &'a GroupId,
    pub family_oop: &'a GroupId,
}

/// Per-rule accumulators. `units_disposed` counts the units this rule
/// consumed (covered units processed, or all units for a not-covered rule);
/// the caller owns whatever remains.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RuleOutcome {
    pub deductibles: f64,
    pub copays: f64,
    pub coinsurance: f64,
    pub reimbursed: f64,
    pub expenses_not_covered: f64,
    pub units_disposed: f64,
    pub limit_attained: bool,
}

pub(crate) fn apply_rule(
    rule: &CoverageRule,
    count: f64,
    cost: f64,
    groups: &GroupBindings<'_>,
    person: &mut BudgetScope,
    family: &mut BudgetScope,
) -> RuleOutcome {
    let mut outcome = RuleOutcome::default();

    let charge = match rule {
        CoverageRule::NotCovered { .. } => {
            outcome.expenses_not_covered = round_cents(count * cost);
            outcome.units_disposed = count;
            return outcome;
        }
        CoverageRule::Charge(charge) => charge,
    };

    let covered = match (charge.covered_count, charge.dollar_limit) {
        (Some(covered_count), _) => count.min(f64::from(covered_count)),
        (None, Some(dollar_limit)) => count.min(dollar_limit / cost),
        (None, None) => count,
    };

    // Units are processed one at a time so the shared budgets clamp
    // correctly; a fractional tail (from a dollar limit) is processed as a
    // partial unit at proportional cost.
    let mut units_left = covered;
    while units_left > 0.0 {
        let unit = units_left.min(1.0);
        process_unit(charge, cost * unit, groups, person, family, &mut outcome);
        outcome.units_disposed += unit;
        units_left -= unit;
        if outcome.limit_attained {
            break;
        }
    }

    outcome
}

fn process_unit(
    charge: &ChargeRule,
    unit_cost: f64,
    groups: &GroupBindings<'_>,
    person: &mut BudgetScope,
    family: &mut BudgetScope,
    outcome: &mut RuleOutcome,
) {
    let mut cost_left = unit_cost;
    let mut single_use_left = charge.single_use_cost_max.unwrap_or(f64::INFINITY);

    if charge.deductible == DeductibleTiming::BeforeCopay {
        deductible_pass(
            groups,
            person,
            family,
            &mut cost_left,
            &mut single_use_left,
            outcome,
        );
    }

    if charge.copay.is_some() {
        copay_pass(
            charge,
            groups,
            person,
            family,
            &mut cost_left,
            &mut single_use_left,
            outcome,
        );
    }

    if charge.deductible == DeductibleTiming::BeforeCoinsurance {
        deductible_pass(
            groups,
            person,
            family,
            &mut cost_left,
            &mut single_use_left,
            outcome,
        );
    }

    if charge.coinsurance.is_some() {
        coinsurance_pass(
            charge,
            groups,
            person,
            family,
            &mut cost_left,
            &mut single_use_left,
            outcome,
        );
    }

    if let Some(limit_id) = &charge.combined_limit_id {
        let available = person
            .combined_limit(limit_id)
            .available()
            .min(family.combined_limit(limit_id).available());
        let reimbursed = round_cents(cost_left.min(available));
        person.combined_limit(limit_id).consume(reimbursed);
        family.combined_limit(limit_id).consume(reimbursed);
        outcome.reimbursed += reimbursed;

        let leftover = round_cents(cost_left - reimbursed);
        if leftover > 0.0 {
            outcome.expenses_not_covered += leftover;
        }

        if person.combined_limit(limit_id).is_exhausted()
            || family.combined_limit(limit_id).is_exhausted()
        {
            outcome.limit_attained = true;
        }
    }
}

/// The deductible draw counts against the deductible group and the
/// out-of-pocket group, for both the person and the family.
fn deductible_pass(
    groups: &GroupBindings<'_>,
    person: &mut BudgetScope,
    family: &mut BudgetScope,
    cost_left: &mut f64,
    single_use_left: &mut f64,
    outcome: &mut RuleOutcome,
) {
    let available = person
        .deductible(groups.person_deductible)
        .available()
        .min(family.deductible(groups.family_deductible).available());
    let paid = round_cents(cost_left.min(*single_use_left).min(available));
    if paid > 0.0 {
        person.deductible(groups.person_deductible).consume(paid);
        family.deductible(groups.family_deductible).consume(paid);
        person.oop_maximum(groups.person_oop).consume(paid);
        family.oop_maximum(groups.family_oop).consume(paid);
        outcome.deductibles += paid;
    }
    *cost_left = (*cost_left - paid).max(0.0);
    *single_use_left = (*single_use_left - paid).max(0.0);
}

/// The cost portion a copay nominally covers is consumed even when the
/// charge itself is clamped by an out-of-pocket maximum; the plan absorbs
/// the difference.
fn copay_pass(
    charge: &ChargeRule,
    groups: &GroupBindings<'_>,
    person: &mut BudgetScope,
    family: &mut BudgetScope,
    cost_left: &mut f64,
    single_use_left: &mut f64,
    outcome: &mut RuleOutcome,
) {
    let Some(copay) = charge.copay else { return };

    let potential = round_cents(cost_left.min(*single_use_left).min(copay));
    let charged = if charge.copay_towards_oop {
        let available = person
            .oop_maximum(groups.person_oop)
            .available()
            .min(family.oop_maximum(groups.family_oop).available());
        let charged = round_cents(potential.min(available));
        person.oop_maximum(groups.person_oop).consume(charged);
        family.oop_maximum(groups.family_oop).consume(charged);
        charged
    } else {
        potential
    };

    outcome.copays += charged;
    *cost_left = (*cost_left - potential).max(0.0);
    *single_use_left = (*single_use_left - potential).max(0.0);
}

fn coinsurance_pass(
    charge: &ChargeRule,
    groups: &GroupBindings<'_>,
    person: &mut BudgetScope,
    family: &mut BudgetScope,
    cost_left: &mut f64,
    single_use_left: &mut f64,
    outcome: &mut RuleOutcome,
) {
    let Some(rate) = charge.coinsurance else { return };

    let mut amount = *cost_left * rate;
    if let Some(floor) = charge.coinsurance_min_dollar {
        amount = amount.max(floor);
    }
    if let Some(cap) = charge.coinsurance_max_dollar {
        amount = amount.min(cap);
    }
    amount = round_cents(amount.min(*cost_left).min(*single_use_left));

    let charged = if charge.coinsurance_towards_oop {
        let available = person
            .oop_maximum(groups.person_oop)
            .available()
            .min(family.oop_maximum(groups.family_oop).available());
        let charged = round_cents(amount.min(available));
        person.oop_maximum(groups.person_oop).consume(charged);
        family.oop_maximum(groups.family_oop).consume(charged);
        charged
    } else {
        amount
    };

    outcome.coinsurance += charged;
    *cost_left = (*cost_left - amount).max(0.0);
    *single_use_left = (*single_use_left - amount).max(0.0);
}
