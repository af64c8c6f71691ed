use std::collections::BTreeMap;
use std::sync::Arc;

use plan_engine::engines::mpce::blueprint::standard_catalog;
use plan_engine::engines::mpce::domain::{PlanId, ServiceId};
use plan_engine::engines::mpce::household::{Household, Utilization};
use plan_engine::engines::mpce::{
    CalculationRequest, PlanCostEngine, PlanInputs, PlanResult, PreparedCatalog,
};

fn engine() -> PlanCostEngine {
    let prepared = PreparedCatalog::prepare(standard_catalog()).expect("standard catalog is valid");
    PlanCostEngine::new(Arc::new(prepared))
}

fn utilization<const N: usize>(entries: [(&str, u32); N]) -> Utilization {
    entries
        .into_iter()
        .map(|(id, count)| (ServiceId::from(id), count))
        .collect()
}

fn request(region: &str, status: &str, household: Household) -> CalculationRequest {
    CalculationRequest {
        region_id: region.into(),
        status_id: status.into(),
        household,
        plan_inputs: BTreeMap::new(),
    }
}

fn plan_result(request: &CalculationRequest, plan: &str) -> PlanResult {
    engine()
        .calculate(request)
        .expect("calculation succeeds")
        .results
        .into_iter()
        .find(|result| result.plan_id.as_str() == plan)
        .expect("plan offered in region")
}

fn assert_cents(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.005,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn hmo_employee_only_low_utilization() {
    let request = request(
        "CA",
        "fullTime",
        Household {
            primary: utilization([("routinePhysical18Plus", 1), ("primaryCarePhysician", 2)]),
            spouse: None,
            children: Vec::new(),
        },
    );
    let result = plan_result(&request, "HMO_CA");

    assert_cents(result.total_deductibles, 0.0);
    assert_cents(result.total_copays, 40.0);
    assert_cents(result.total_coinsurance, 0.0);
    assert_cents(result.total_expenses_not_covered, 0.0);
    assert_cents(result.total_raw_expenses, 752.21);
    assert_cents(result.annual_premium, 936.0);
    assert_cents(result.total_annual_payroll_contributions, 936.0);
}

#[test]
fn ppo_family_emergency_room_visit_exhausts_the_deductible() {
    let request = request(
        "AZ",
        "fullTime",
        Household {
            primary: utilization([("emergencyRoomVisit", 1)]),
            spouse: Some(utilization([])),
            children: vec![utilization([])],
        },
    );

    let outcome = engine().calculate(&request).expect("calculation succeeds");
    assert_eq!(outcome.coverage_level_id.as_str(), "employeeAndFamily");

    let result = outcome
        .results
        .into_iter()
        .find(|result| result.plan_id.as_str() == "PPO_300")
        .expect("PPO offered in AZ");

    assert_cents(result.total_copays, 100.0);
    assert_cents(result.total_deductibles, 900.0);
    assert_cents(result.total_coinsurance, 64.10);
    assert_cents(result.total_expenses_not_covered, 0.0);
    assert_cents(result.total_raw_expenses, 1_640.96);
    assert_cents(result.total_employer_or_plan_paid_excluding_fund, 576.86);
}

#[test]
fn cdhp_fund_offsets_deductible_spend_and_carries_the_rest() {
    let request = request(
        "CA",
        "fullTime",
        Household {
            primary: utilization([("primaryCarePhysician", 1)]),
            spouse: None,
            children: Vec::new(),
        },
    );
    let result = plan_result(&request, "CDHP");

    assert_cents(result.total_deductibles, 135.78);
    assert_cents(result.total_coinsurance, 0.0);
    assert_cents(result.total_fund_eligible_costs, 135.78);
    assert_cents(result.plan_fund_amount, 450.0);
    assert_cents(result.total_fund_amount_offset, 135.78);
    assert_cents(result.plan_fund_paid, 135.78);
    assert_cents(result.rollover_fund_paid, 0.0);
    assert_cents(result.voluntary_fund_paid, 0.0);
    assert_cents(result.fund_carryover_balance, 314.22);
}

#[test]
fn split_rx_group_caps_drug_copays_without_going_negative() {
    let request = request(
        "AZ",
        "fullTime",
        Household {
            primary: utilization([("brandDrugs1MonthSupply", 100)]),
            spouse: Some(utilization([("brandDrugs1MonthSupply", 100)])),
            children: Vec::new(),
        },
    );
    let result = plan_result(&request, "HMO_AZ");

    // Each member is clamped by the per-person rx cap (1,500) and the
    // family rx cap (2,000); copays never drive either group negative, and
    // fills past the caps are still covered rather than charged.
    assert_cents(result.total_copays, 2_000.0);
    assert_cents(result.total_expenses_not_covered, 0.0);
    assert_cents(result.total_raw_expenses, 200.0 * 174.37);
    assert_cents(
        result.total_employer_or_plan_paid_excluding_fund,
        200.0 * 174.37 - 2_000.0,
    );
}

#[test]
fn member_cost_pieces_always_sum_to_raw_expenses() {
    let households: Vec<Household> = vec![
        Household {
            primary: utilization([("routinePhysical18Plus", 1)]),
            spouse: None,
            children: Vec::new(),
        },
        Household {
            primary: utilization([
                ("primaryCarePhysician", 6),
                ("specialistVisit", 4),
                ("physicalTherapyVisit", 16),
                ("chiropracticVisit", 10),
                ("emergencyRoomVisit", 1),
                ("inpatientHospitalStay", 1),
                ("genericDrugs1MonthSupply", 12),
                ("brandDrugs1MonthSupply", 12),
                ("additionalServicesDollarAmount", 1_250),
            ]),
            spouse: Some(utilization([
                ("primaryCarePhysician", 4),
                ("outpatientSurgery", 1),
                ("brandDrugs1MonthSupply", 6),
            ])),
            children: vec![
                utilization([("primaryCarePhysician", 3), ("emergencyRoomVisit", 1)]),
                utilization([("genericDrugs1MonthSupply", 3)]),
            ],
        },
    ];

    let engine = engine();
    for household in households {
        for region in ["CA", "AZ"] {
            for status in ["fullTime", "partTime"] {
                let request = request(region, status, household.clone());
                let outcome = engine.calculate(&request).expect("calculation succeeds");
                for result in &outcome.results {
                    let pieces = result.total_deductibles
                        + result.total_copays
                        + result.total_coinsurance
                        + result.total_expenses_not_covered
                        + result.total_employer_or_plan_paid_excluding_fund;
                    assert!(
                        (pieces - result.total_raw_expenses).abs() < 0.005,
                        "accounting identity broken for {} in {region}/{status}",
                        result.plan_id
                    );
                    assert!(result.total_deductibles >= 0.0);
                    assert!(result.total_copays >= 0.0);
                    assert!(result.total_coinsurance >= 0.0);
                    assert!(result.total_expenses_not_covered >= 0.0);
                    assert!(result.total_annual_payroll_contributions >= 0.0);
                }
            }
        }
    }
}

#[test]
fn fund_split_sums_to_the_offset_with_priority_consumption() {
    let mut request = request(
        "CA",
        "fullTime",
        Household {
            primary: utilization([
                ("primaryCarePhysician", 5),
                ("specialistVisit", 3),
                ("inpatientHospitalStay", 1),
            ]),
            spouse: None,
            children: Vec::new(),
        },
    );
    request.plan_inputs.insert(
        PlanId::from("CDHP"),
        PlanInputs {
            rollover_amount: 350.0,
            voluntary_contribution: 600.0,
            premium_adjustment_amount: 0.0,
            additional_match_amount: 150.0,
        },
    );

    let outcome = engine().calculate(&request).expect("calculation succeeds");
    let result = outcome
        .results
        .iter()
        .find(|result| result.plan_id.as_str() == "CDHP")
        .expect("CDHP offered");

    let split = result.plan_fund_paid
        + result.plan_fund_additional_match_paid
        + result.rollover_fund_paid
        + result.voluntary_fund_paid;
    assert!((split - result.total_fund_amount_offset).abs() < 0.005);

    let sources = [
        (result.plan_fund_paid, result.plan_fund_amount),
        (result.plan_fund_additional_match_paid, 150.0),
        (result.rollover_fund_paid, 350.0),
        (result.voluntary_fund_paid, 600.0),
    ];
    let mut earlier_fully_drained = true;
    for (paid, cap) in sources {
        if paid > 0.0 {
            assert!(
                earlier_fully_drained,
                "a later fund source paid before an earlier one drained"
            );
        }
        earlier_fully_drained = earlier_fully_drained && (cap - paid).abs() < 0.005;
    }

    let total_sources = result.plan_fund_amount + 150.0 + 350.0 + 600.0;
    assert!(
        (result.fund_carryover_balance - (total_sources - result.total_fund_amount_offset)).abs()
            < 0.005
    );
    assert!(
        result.total_fund_amount_offset
            <= result.total_fund_eligible_costs.min(total_sources) + 0.005
    );
}

#[test]
fn calculations_are_idempotent_across_engines_and_calls() {
    let request = request(
        "AZ",
        "partTime",
        Household {
            primary: utilization([("emergencyRoomVisit", 1), ("brandDrugs1MonthSupply", 4)]),
            spouse: Some(utilization([("primaryCarePhysician", 2)])),
            children: vec![utilization([("routinePhysical18Plus", 1)])],
        },
    );

    let first = engine().calculate(&request).expect("first engine");
    let second = engine().calculate(&request).expect("second engine");
    assert_eq!(first.results, second.results);
}
