//! The built-in benefits catalog: a PPO, a consumer-driven plan with an
//! employer-seeded fund, and two regional HMOs across two rating regions.
//! Served when no catalog file is configured, and the fixture the scenario
//! tests run against.

use std::collections::BTreeMap;

use super::domain::{
    AmountMap, AmountMapNode, BenefitsCatalog, CombinedLimit, CoverageEntry, CoverageLevel,
    CoverageLevelId, EmploymentStatus, HealthStatus, MedicalService, Plan, PremiumNode,
    PremiumTable, RawCoverageRule, Region, RegionId, ServiceCategory, ServiceId, StatusId, Text,
};

const PPO: &str = "PPO_300";
const CDHP: &str = "CDHP";
const HMO_CA: &str = "HMO_CA";
const HMO_AZ: &str = "HMO_AZ";

const CDHP_COSTS: &str = "costs_cdhp";

/// Build the standard catalog. The result always passes validation; the
/// constructor is pure and cheap enough to call per test.
pub fn standard_catalog() -> BenefitsCatalog {
    BenefitsCatalog {
        regions: BTreeMap::from([
            (
                RegionId::from("CA"),
                Region {
                    description: Text::plain("California"),
                    plans: plan_ids([PPO, CDHP, HMO_CA]),
                },
            ),
            (
                RegionId::from("AZ"),
                Region {
                    description: Text::plain("Arizona"),
                    plans: plan_ids([PPO, CDHP, HMO_AZ]),
                },
            ),
        ]),
        regions_order: vec![RegionId::from("CA"), RegionId::from("AZ")],
        plans: plans(),
        plans_order: plan_ids([PPO, CDHP, HMO_CA, HMO_AZ]),
        statuses: BTreeMap::from([
            (
                StatusId::from("fullTime"),
                EmploymentStatus {
                    description: Text::plain("Full-time"),
                },
            ),
            (
                StatusId::from("partTime"),
                EmploymentStatus {
                    description: Text::plain("Part-time"),
                },
            ),
        ]),
        statuses_order: vec![StatusId::from("fullTime"), StatusId::from("partTime")],
        coverage_levels: coverage_levels(),
        coverage_levels_order: vec![
            CoverageLevelId::from("employeeOnly"),
            CoverageLevelId::from("employeeAndChildren"),
            CoverageLevelId::from("employeeAndSpouse"),
            CoverageLevelId::from("employeeAndFamily"),
        ],
        categories: BTreeMap::from([
            (
                "outpatientServices".into(),
                ServiceCategory {
                    description: Text::plain("Outpatient services"),
                    ordered_contents: service_ids([
                        "routinePhysical18Plus",
                        "primaryCarePhysician",
                        "specialistVisit",
                        "physicalTherapyVisit",
                        "chiropracticVisit",
                        "additionalServicesDollarAmount",
                    ]),
                },
            ),
            (
                "inpatientServices".into(),
                ServiceCategory {
                    description: Text::plain("Inpatient and facility services"),
                    ordered_contents: service_ids([
                        "emergencyRoomVisit",
                        "inpatientHospitalStay",
                        "outpatientSurgery",
                    ]),
                },
            ),
            (
                "drugs".into(),
                ServiceCategory {
                    description: Text::plain("Prescription drugs"),
                    ordered_contents: service_ids([
                        "genericDrugs1MonthSupply",
                        "brandDrugs1MonthSupply",
                    ]),
                },
            ),
        ]),
        categories_order: vec!["outpatientServices".into(), "inpatientServices".into(), "drugs".into()],
        services: services(),
        combined_limits: BTreeMap::from([(
            "chiropracticAnnualMax".into(),
            CombinedLimit {
                description: Text::plain("Chiropractic care annual maximum"),
                person_reimburse_limit: Some(500.0),
                family_reimburse_limit: Some(1000.0),
            },
        )]),
        combined_limits_order: vec!["chiropracticAnnualMax".into()],
        coverage_level_costs_per_plan: premiums(),
        health_statuses: health_statuses(),
        health_statuses_order: vec!["low".into(), "moderate".into(), "high".into()],
    }
}

fn coverage_levels() -> BTreeMap<CoverageLevelId, CoverageLevel> {
    BTreeMap::from([
        (
            CoverageLevelId::from("employeeOnly"),
            CoverageLevel {
                description: Text::plain("Employee only"),
                spouse: false,
                max_num_children: Some(0),
            },
        ),
        (
            CoverageLevelId::from("employeeAndChildren"),
            CoverageLevel {
                description: Text::plain("Employee + children"),
                spouse: false,
                max_num_children: None,
            },
        ),
        (
            CoverageLevelId::from("employeeAndSpouse"),
            CoverageLevel {
                description: Text::plain("Employee + spouse"),
                spouse: true,
                max_num_children: Some(0),
            },
        ),
        (
            CoverageLevelId::from("employeeAndFamily"),
            CoverageLevel {
                description: Text::plain("Employee + family"),
                spouse: true,
                max_num_children: None,
            },
        ),
    ])
}

fn plans() -> BTreeMap<super::domain::PlanId, Plan> {
    BTreeMap::from([
        (
            PPO.into(),
            Plan {
                description: Text::plain("PPO $300"),
                person_deductibles: None,
                family_deductibles: Some(BTreeMap::from([(
                    "general".into(),
                    limit_by_level([300.0, 600.0, 600.0, 900.0]),
                )])),
                person_out_of_pocket_maximums: None,
                family_out_of_pocket_maximums: Some(BTreeMap::from([(
                    "general".into(),
                    limit_by_level([1700.0, 3300.0, 3300.0, 4900.0]),
                )])),
                fund_amount_map: None,
                categories_fund_applies_to: None,
                fund_allows_contributions: None,
                costs_object_id: None,
            },
        ),
        (
            CDHP.into(),
            Plan {
                description: Text::plain("Consumer-driven health plan"),
                person_deductibles: None,
                family_deductibles: Some(BTreeMap::from([(
                    "general".into(),
                    limit_by_level([1500.0, 3000.0, 3000.0, 3000.0]),
                )])),
                person_out_of_pocket_maximums: None,
                family_out_of_pocket_maximums: Some(BTreeMap::from([(
                    "general".into(),
                    limit_by_level([3000.0, 6000.0, 6000.0, 6000.0]),
                )])),
                fund_amount_map: Some(amount_map_by_level([450.0, 900.0, 900.0, 900.0])),
                categories_fund_applies_to: Some(BTreeMap::from([
                    ("outpatientServices".into(), true),
                    ("inpatientServices".into(), true),
                    ("drugs".into(), false),
                ])),
                fund_allows_contributions: Some(true),
                costs_object_id: Some(CDHP_COSTS.to_string()),
            },
        ),
        (
            HMO_CA.into(),
            Plan {
                description: Text::plain("HMO (California)"),
                person_deductibles: None,
                family_deductibles: None,
                person_out_of_pocket_maximums: Some(BTreeMap::from([(
                    "general".into(),
                    limit_by_level([1500.0, 1500.0, 1500.0, 1500.0]),
                )])),
                family_out_of_pocket_maximums: Some(BTreeMap::from([(
                    "general".into(),
                    limit_by_level([1500.0, 3000.0, 3000.0, 4500.0]),
                )])),
                fund_amount_map: None,
                categories_fund_applies_to: None,
                fund_allows_contributions: None,
                costs_object_id: None,
            },
        ),
        (
            HMO_AZ.into(),
            Plan {
                description: Text::plain("HMO (Arizona)"),
                person_deductibles: None,
                family_deductibles: None,
                person_out_of_pocket_maximums: Some(BTreeMap::from([
                    (
                        "general".into(),
                        limit_by_level([1600.0, 1600.0, 1600.0, 1600.0]),
                    ),
                    ("oopmax_rx".into(), rx_limit_group(1500.0)),
                ])),
                family_out_of_pocket_maximums: Some(BTreeMap::from([
                    (
                        "general".into(),
                        limit_by_level([1600.0, 3200.0, 3200.0, 4800.0]),
                    ),
                    ("oopmax_rx".into(), rx_limit_group(2000.0)),
                ])),
                fund_amount_map: None,
                categories_fund_applies_to: None,
                fund_allows_contributions: None,
                costs_object_id: None,
            },
        ),
    ])
}

fn services() -> BTreeMap<ServiceId, MedicalService> {
    let mut services = BTreeMap::new();

    services.insert(
        ServiceId::from("routinePhysical18Plus"),
        service(
            "Routine physical (18+)",
            [237.73, 237.73],
            [210.11, 210.11],
            [
                (PPO, one(no_deductible_coinsurance(0.0))),
                (CDHP, one(no_deductible_coinsurance(0.0))),
                (HMO_CA, one(copay(0.0))),
                (HMO_AZ, one(copay(0.0))),
            ],
        ),
    );
    services.insert(
        ServiceId::from("primaryCarePhysician"),
        service(
            "Primary care physician visit",
            [257.24, 182.40],
            [135.78, 135.78],
            [
                (PPO, one(copay(25.0))),
                (CDHP, one(deductible_then_coinsurance(0.10))),
                (HMO_CA, one(copay(20.0))),
                (HMO_AZ, one(copay(20.0))),
            ],
        ),
    );
    services.insert(
        ServiceId::from("specialistVisit"),
        service(
            "Specialist visit",
            [398.50, 341.10],
            [305.27, 305.27],
            [
                (PPO, one(copay(40.0))),
                (CDHP, one(deductible_then_coinsurance(0.10))),
                (HMO_CA, one(copay(35.0))),
                (HMO_AZ, one(copay(35.0))),
            ],
        ),
    );
    services.insert(
        ServiceId::from("physicalTherapyVisit"),
        service(
            "Physical therapy visit",
            [128.40, 110.25],
            [98.60, 98.60],
            [
                (PPO, visits_then_not_covered(copay(25.0), 10)),
                (CDHP, visits_then_not_covered(deductible_then_coinsurance(0.10), 20)),
                (HMO_CA, visits_then_not_covered(copay(25.0), 12)),
                (HMO_AZ, visits_then_not_covered(copay(25.0), 12)),
            ],
        ),
    );
    services.insert(
        ServiceId::from("chiropracticVisit"),
        service(
            "Chiropractic visit",
            [92.30, 85.75],
            [78.15, 78.15],
            [
                (PPO, one(combined_limit_coinsurance(0.20))),
                (CDHP, one(combined_limit_coinsurance(0.20))),
                (HMO_CA, one(copay(15.0))),
                (HMO_AZ, one(copay(15.0))),
            ],
        ),
    );
    services.insert(
        ServiceId::from("additionalServicesDollarAmount"),
        service(
            "Additional medical spend (dollar amount)",
            [1.0, 1.0],
            [1.0, 1.0],
            [
                (PPO, one(deductible_then_coinsurance(0.20))),
                (CDHP, one(deductible_then_coinsurance(0.20))),
                (HMO_CA, one(no_deductible_coinsurance(0.20))),
                (HMO_AZ, one(no_deductible_coinsurance(0.20))),
            ],
        ),
    );
    services.insert(
        ServiceId::from("emergencyRoomVisit"),
        service(
            "Emergency room visit",
            [1847.22, 1640.96],
            [1512.88, 1512.88],
            [
                (PPO, one(er_rule())),
                (CDHP, one(deductible_then_coinsurance(0.10))),
                (HMO_CA, one(copay(150.0))),
                (HMO_AZ, one(copay(150.0))),
            ],
        ),
    );
    services.insert(
        ServiceId::from("inpatientHospitalStay"),
        service(
            "Inpatient hospital stay",
            [22350.75, 19874.60],
            [17210.40, 17210.40],
            [
                (PPO, one(deductible_then_coinsurance(0.10))),
                (CDHP, one(deductible_then_coinsurance(0.10))),
                (HMO_CA, one(copay(500.0))),
                (HMO_AZ, one(copay(500.0))),
            ],
        ),
    );
    services.insert(
        ServiceId::from("outpatientSurgery"),
        service(
            "Outpatient surgery",
            [5210.33, 4788.91],
            [4205.17, 4205.17],
            [
                (PPO, one(deductible_then_coinsurance(0.10))),
                (CDHP, one(deductible_then_coinsurance(0.10))),
                (HMO_CA, one(copay(250.0))),
                (HMO_AZ, one(copay(250.0))),
            ],
        ),
    );
    services.insert(
        ServiceId::from("genericDrugs1MonthSupply"),
        service(
            "Generic drugs (1 month supply)",
            [28.64, 25.12],
            [21.75, 21.75],
            [
                (PPO, one(copay(10.0))),
                (CDHP, one(drug_coinsurance(0.25, Some(5.0), None))),
                (HMO_CA, one(copay(10.0))),
                (HMO_AZ, one(copay(10.0))),
            ],
        ),
    );
    services.insert(
        ServiceId::from("brandDrugs1MonthSupply"),
        service(
            "Brand-name drugs (1 month supply)",
            [182.91, 174.37],
            [158.22, 158.22],
            [
                (PPO, one(copay(30.0))),
                (CDHP, one(drug_coinsurance(0.25, None, Some(60.0)))),
                (HMO_CA, one(copay(30.0))),
                (HMO_AZ, one(copay(30.0))),
            ],
        ),
    );

    services
}

fn premiums() -> BTreeMap<super::domain::PlanId, PremiumTable> {
    BTreeMap::from([
        (
            PPO.into(),
            PremiumTable(BTreeMap::from([
                (
                    "CA".to_string(),
                    PremiumNode::ByCoverageLevel(premium_levels([
                        (1800.0, 2250.0),
                        (2880.0, 3600.0),
                        (3240.0, 4050.0),
                        (4320.0, 5400.0),
                    ])),
                ),
                (
                    "AZ".to_string(),
                    PremiumNode::ByCoverageLevel(premium_levels([
                        (1650.0, 2062.50),
                        (2640.0, 3300.0),
                        (2970.0, 3712.50),
                        (3960.0, 4950.0),
                    ])),
                ),
            ])),
        ),
        (
            CDHP.into(),
            premium_direct([
                (1200.0, 1500.0),
                (1920.0, 2400.0),
                (2160.0, 2700.0),
                (2880.0, 3600.0),
            ]),
        ),
        (
            HMO_CA.into(),
            premium_direct([
                (936.0, 1170.0),
                (1497.60, 1872.0),
                (1684.80, 2106.0),
                (2246.40, 2808.0),
            ]),
        ),
        (
            HMO_AZ.into(),
            premium_direct([
                (900.0, 1125.0),
                (1440.0, 1800.0),
                (1620.0, 2025.0),
                (2160.0, 2700.0),
            ]),
        ),
    ])
}

fn health_statuses() -> BTreeMap<super::domain::HealthStatusId, HealthStatus> {
    BTreeMap::from([
        (
            "low".into(),
            HealthStatus {
                description: Text::plain("Low utilization"),
                contents: utilization([
                    ("routinePhysical18Plus", 1),
                    ("primaryCarePhysician", 1),
                    ("genericDrugs1MonthSupply", 2),
                ]),
            },
        ),
        (
            "moderate".into(),
            HealthStatus {
                description: Text::plain("Moderate utilization"),
                contents: utilization([
                    ("routinePhysical18Plus", 1),
                    ("primaryCarePhysician", 3),
                    ("specialistVisit", 2),
                    ("physicalTherapyVisit", 2),
                    ("genericDrugs1MonthSupply", 6),
                    ("brandDrugs1MonthSupply", 2),
                ]),
            },
        ),
        (
            "high".into(),
            HealthStatus {
                description: Text::plain("High utilization"),
                contents: utilization([
                    ("routinePhysical18Plus", 1),
                    ("primaryCarePhysician", 6),
                    ("specialistVisit", 6),
                    ("physicalTherapyVisit", 12),
                    ("chiropracticVisit", 8),
                    ("emergencyRoomVisit", 1),
                    ("inpatientHospitalStay", 1),
                    ("genericDrugs1MonthSupply", 12),
                    ("brandDrugs1MonthSupply", 6),
                ]),
            },
        ),
    ])
}

// --- construction helpers -------------------------------------------------

fn plan_ids<const N: usize>(ids: [&str; N]) -> Vec<super::domain::PlanId> {
    ids.into_iter().map(Into::into).collect()
}

fn service_ids<const N: usize>(ids: [&str; N]) -> Vec<ServiceId> {
    ids.into_iter().map(Into::into).collect()
}

/// Amounts ordered employeeOnly, employeeAndChildren, employeeAndSpouse,
/// employeeAndFamily.
fn amount_map_by_level(amounts: [f64; 4]) -> AmountMap {
    let levels = [
        "employeeOnly",
        "employeeAndChildren",
        "employeeAndSpouse",
        "employeeAndFamily",
    ];
    AmountMap(
        levels
            .into_iter()
            .zip(amounts)
            .map(|(level, amount)| (level.to_string(), AmountMapNode::Amount(amount)))
            .collect(),
    )
}

fn limit_by_level(amounts: [f64; 4]) -> super::domain::LimitGroup {
    super::domain::LimitGroup {
        categories: None,
        amount: None,
        amount_map: Some(amount_map_by_level(amounts)),
    }
}

fn rx_limit_group(amount: f64) -> super::domain::LimitGroup {
    super::domain::LimitGroup {
        categories: Some(std::iter::once("drugs".into()).collect()),
        amount: Some(amount),
        amount_map: None,
    }
}

fn premium_levels(
    rates: [(f64, f64); 4],
) -> BTreeMap<CoverageLevelId, BTreeMap<StatusId, Option<f64>>> {
    let levels = [
        "employeeOnly",
        "employeeAndChildren",
        "employeeAndSpouse",
        "employeeAndFamily",
    ];
    levels
        .into_iter()
        .zip(rates)
        .map(|(level, (full_time, part_time))| {
            (
                CoverageLevelId::from(level),
                BTreeMap::from([
                    (StatusId::from("fullTime"), Some(full_time)),
                    (StatusId::from("partTime"), Some(part_time)),
                ]),
            )
        })
        .collect()
}

fn premium_direct(rates: [(f64, f64); 4]) -> PremiumTable {
    PremiumTable(
        premium_levels(rates)
            .into_iter()
            .map(|(level, by_status)| (level.0, PremiumNode::ByStatus(by_status)))
            .collect(),
    )
}

fn utilization<const N: usize>(
    entries: [(&str, u32); N],
) -> BTreeMap<ServiceId, u32> {
    entries
        .into_iter()
        .map(|(id, count)| (ServiceId::from(id), count))
        .collect()
}

fn service<const N: usize>(
    description: &str,
    costs: [f64; 2],
    cdhp_costs: [f64; 2],
    coverage: [(&str, CoverageEntry); N],
) -> MedicalService {
    let regions = |amounts: [f64; 2]| {
        BTreeMap::from([
            (RegionId::from("CA"), amounts[0]),
            (RegionId::from("AZ"), amounts[1]),
        ])
    };
    MedicalService {
        description: Text::plain(description),
        coverage: coverage
            .into_iter()
            .map(|(plan, entry)| (plan.into(), entry))
            .collect(),
        costs_for_display: None,
        cost_tables: BTreeMap::from([
            ("costs".to_string(), regions(costs)),
            (CDHP_COSTS.to_string(), regions(cdhp_costs)),
        ]),
    }
}

fn one(rule: RawCoverageRule) -> CoverageEntry {
    CoverageEntry::One(rule)
}

fn copay(amount: f64) -> RawCoverageRule {
    RawCoverageRule {
        copay: Some(amount),
        deductible: Some("none".to_string()),
        ..Default::default()
    }
}

fn deductible_then_coinsurance(rate: f64) -> RawCoverageRule {
    RawCoverageRule {
        coinsurance: Some(rate),
        deductible: Some("beforeCoinsurance".to_string()),
        ..Default::default()
    }
}

fn no_deductible_coinsurance(rate: f64) -> RawCoverageRule {
    RawCoverageRule {
        coinsurance: Some(rate),
        deductible: Some("none".to_string()),
        ..Default::default()
    }
}

fn er_rule() -> RawCoverageRule {
    RawCoverageRule {
        copay: Some(100.0),
        coinsurance: Some(0.10),
        deductible: Some("afterCopay".to_string()),
        ..Default::default()
    }
}

fn combined_limit_coinsurance(rate: f64) -> RawCoverageRule {
    RawCoverageRule {
        coinsurance: Some(rate),
        deductible: Some("none".to_string()),
        combined_limit_id: Some("chiropracticAnnualMax".into()),
        ..Default::default()
    }
}

fn drug_coinsurance(rate: f64, min_dollar: Option<f64>, max_dollar: Option<f64>) -> RawCoverageRule {
    RawCoverageRule {
        coinsurance: Some(rate),
        coinsurance_min_dollar: min_dollar,
        coinsurance_max_dollar: max_dollar,
        deductible: Some("beforeCoinsurance".to_string()),
        ..Default::default()
    }
}

fn visits_then_not_covered(covered_rule: RawCoverageRule, visits: u32) -> CoverageEntry {
    let mut covered_rule = covered_rule;
    covered_rule.covered_count = Some(f64::from(visits));
    CoverageEntry::Many(vec![
        covered_rule,
        RawCoverageRule {
            not_covered: Some(true),
            ..Default::default()
        },
    ])
}
