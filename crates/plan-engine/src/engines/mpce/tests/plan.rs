use super::common::{employee_only_request, engine, utilization};
use crate::engines::mpce::domain::PlanId;
use crate::engines::mpce::{PlanInputs, PlanResult};

fn result_for(
    mut request: crate::engines::mpce::CalculationRequest,
    plan: &str,
    inputs: Option<PlanInputs>,
) -> PlanResult {
    if let Some(inputs) = inputs {
        request.plan_inputs.insert(PlanId::from(plan), inputs);
    }
    let outcome = engine().calculate(&request).expect("calculation succeeds");
    outcome
        .results
        .into_iter()
        .find(|result| result.plan_id.as_str() == plan)
        .expect("plan present in the region")
}

#[test]
fn deductible_bearing_services_consume_shared_budgets_first() {
    // Twenty no-deductible office visits plus one hospital stay. The stay
    // must reach the out-of-pocket ceiling before the visits can: the
    // office copays are fully absorbed by the exhausted ceiling instead of
    // competing with the hospital coinsurance for it.
    let request = employee_only_request(
        "CA",
        "fullTime",
        utilization([("primaryCarePhysician", 20), ("inpatientHospitalStay", 1)]),
    );
    let result = result_for(request, "PPO_300", None);

    assert_eq!(result.total_deductibles, 300.0);
    assert_eq!(result.total_coinsurance, 1_400.0);
    assert_eq!(result.total_copays, 0.0);
    assert_eq!(result.total_expenses_not_covered, 0.0);
}

#[test]
fn fund_sources_are_consumed_in_priority_order() {
    let request = employee_only_request(
        "CA",
        "fullTime",
        utilization([("primaryCarePhysician", 4)]),
    );
    let inputs = PlanInputs {
        rollover_amount: 200.0,
        voluntary_contribution: 300.0,
        premium_adjustment_amount: 0.0,
        additional_match_amount: 100.0,
    };
    let result = result_for(request, "CDHP", Some(inputs));

    // Four negotiated-rate visits land entirely under the deductible and
    // are fund eligible: 4 * 135.78 = 543.12.
    assert_eq!(result.total_fund_eligible_costs, 543.12);
    assert_eq!(result.total_fund_amount_offset, 543.12);
    assert_eq!(result.plan_fund_paid, 450.0);
    assert_eq!(result.plan_fund_additional_match_paid, 93.12);
    assert_eq!(result.rollover_fund_paid, 0.0);
    assert_eq!(result.voluntary_fund_paid, 0.0);
    assert_eq!(result.fund_carryover_balance, 506.88);
    assert_eq!(result.total_current_year_fund_contributions, 300.0);
}

#[test]
fn fund_offset_drains_every_source_when_costs_exceed_them() {
    let request = employee_only_request(
        "CA",
        "fullTime",
        utilization([("primaryCarePhysician", 8)]),
    );
    let inputs = PlanInputs {
        rollover_amount: 200.0,
        voluntary_contribution: 300.0,
        premium_adjustment_amount: 0.0,
        additional_match_amount: 100.0,
    };
    let result = result_for(request, "CDHP", Some(inputs));

    // 8 * 135.78 = 1,086.24 eligible against 1,050 of fund sources.
    assert_eq!(result.total_fund_amount_offset, 1_050.0);
    assert_eq!(result.plan_fund_paid, 450.0);
    assert_eq!(result.plan_fund_additional_match_paid, 100.0);
    assert_eq!(result.rollover_fund_paid, 200.0);
    assert_eq!(result.voluntary_fund_paid, 300.0);
    assert_eq!(result.fund_carryover_balance, 0.0);
}

#[test]
fn premium_adjustments_never_drive_payroll_below_zero() {
    let base = employee_only_request("CA", "fullTime", utilization([]));

    let discounted = result_for(
        base.clone(),
        "HMO_CA",
        Some(PlanInputs {
            premium_adjustment_amount: -10_000.0,
            ..Default::default()
        }),
    );
    assert_eq!(discounted.annual_premium, 936.0);
    assert_eq!(discounted.total_annual_payroll_contributions, 0.0);

    let surcharged = result_for(
        base,
        "HMO_CA",
        Some(PlanInputs {
            premium_adjustment_amount: 120.0,
            ..Default::default()
        }),
    );
    assert_eq!(surcharged.total_annual_payroll_contributions, 1_056.0);
}

#[test]
fn additional_spend_counts_are_read_as_raw_dollars() {
    let request = employee_only_request(
        "CA",
        "fullTime",
        utilization([("additionalServicesDollarAmount", 500)]),
    );
    let result = result_for(request, "PPO_300", None);

    // One event costing 500: deductible 300, then 20% of the remainder.
    assert_eq!(result.total_raw_expenses, 500.0);
    assert_eq!(result.total_deductibles, 300.0);
    assert_eq!(result.total_coinsurance, 40.0);
    assert_eq!(result.total_employer_or_plan_paid_excluding_fund, 160.0);
}

#[test]
fn derived_totals_compose_from_the_member_cost_pieces() {
    let request = employee_only_request(
        "AZ",
        "fullTime",
        utilization([
            ("routinePhysical18Plus", 1),
            ("primaryCarePhysician", 3),
            ("specialistVisit", 2),
            ("emergencyRoomVisit", 1),
            ("genericDrugs1MonthSupply", 6),
        ]),
    );
    let outcome = engine().calculate(&request).expect("calculation succeeds");

    for result in &outcome.results {
        let member_pieces = result.total_deductibles
            + result.total_copays
            + result.total_coinsurance
            + result.total_expenses_not_covered;
        assert!((result.total_medical_and_drug_costs - member_pieces).abs() < 0.005);
        assert!(
            (result.total_raw_expenses
                - member_pieces
                - result.total_employer_or_plan_paid_excluding_fund)
                .abs()
                < 0.005
        );
        assert!(
            (result.total_medical_and_drug_costs_less_fund_offset
                - (result.total_medical_and_drug_costs - result.total_fund_amount_offset))
                .abs()
                < 0.005
        );
        assert!(
            (result.total_care_and_payroll_contributions
                - (result.total_medical_and_drug_costs_less_fund_offset
                    + result.total_annual_payroll_contributions))
                .abs()
                < 0.005
        );
        assert!(result.total_annual_payroll_contributions >= 0.0);
    }
}
