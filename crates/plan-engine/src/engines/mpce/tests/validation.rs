use super::common::catalog;
use crate::engines::mpce::domain::{
    AmountMapNode, CategoryId, CoverageEntry, GroupId, PlanId, RawCoverageRule, RegionId,
    ServiceId,
};
use crate::engines::mpce::validation::validate;

fn issues_of(catalog: &crate::engines::mpce::domain::BenefitsCatalog) -> Vec<String> {
    validate(catalog).expect_err("catalog should be invalid").issues
}

#[test]
fn standard_catalog_is_valid() {
    validate(&catalog()).expect("standard catalog passes validation");
}

#[test]
fn order_sequences_must_agree_with_their_maps() {
    let mut catalog = catalog();
    catalog.plans_order.retain(|id| id.as_str() != "CDHP");
    catalog.regions_order.push("CA".into());

    let issues = issues_of(&catalog);
    assert!(issues
        .iter()
        .any(|issue| issue.contains("'CDHP' is missing from plansOrder")));
    assert!(issues
        .iter()
        .any(|issue| issue.contains("regionsOrder: duplicate id 'CA'")));
}

#[test]
fn region_plans_must_exist() {
    let mut catalog = catalog();
    catalog
        .regions
        .get_mut(&RegionId::from("CA"))
        .expect("CA region")
        .plans
        .push("EPO_500".into());

    let issues = issues_of(&catalog);
    assert!(issues
        .iter()
        .any(|issue| issue.contains("region 'CA': unknown plan 'EPO_500'")));
}

#[test]
fn every_service_lives_in_exactly_one_category() {
    let mut catalog = catalog();
    let specialist = ServiceId::from("specialistVisit");
    catalog
        .categories
        .get_mut(&CategoryId::from("drugs"))
        .expect("drugs category")
        .ordered_contents
        .push(specialist);

    let issues = issues_of(&catalog);
    assert!(issues
        .iter()
        .any(|issue| issue.contains("'specialistVisit' appears in categories")));
}

#[test]
fn limit_families_require_a_general_catch_all() {
    let mut catalog = catalog();
    let ppo = catalog.plans.get_mut(&PlanId::from("PPO_300")).expect("PPO");
    let deductibles = ppo.family_deductibles.as_mut().expect("family deductibles");
    let general = deductibles.remove(&GroupId::general()).expect("general group");
    deductibles.insert("medical".into(), general);

    let issues = issues_of(&catalog);
    assert!(issues
        .iter()
        .any(|issue| issue.contains("missing the 'general' group")));
    assert!(issues
        .iter()
        .any(|issue| issue.contains("group 'medical' names no categories")));
}

#[test]
fn named_groups_may_not_share_a_category() {
    let mut catalog = catalog();
    let hmo = catalog.plans.get_mut(&PlanId::from("HMO_AZ")).expect("HMO_AZ");
    let oop = hmo
        .family_out_of_pocket_maximums
        .as_mut()
        .expect("family OOP groups");
    let mut second = oop[&GroupId::from("oopmax_rx")].clone();
    second.amount = Some(750.0);
    oop.insert("oopmax_rx2".into(), second);

    let issues = issues_of(&catalog);
    assert!(issues
        .iter()
        .any(|issue| issue.contains("category 'drugs' is claimed by groups")));
}

#[test]
fn costs_object_ids_follow_the_naming_scheme() {
    let mut catalog = catalog();
    catalog
        .plans
        .get_mut(&PlanId::from("CDHP"))
        .expect("CDHP")
        .costs_object_id = Some("negotiated".to_string());

    let issues = issues_of(&catalog);
    assert!(issues
        .iter()
        .any(|issue| issue.contains("costsObjectId 'negotiated'")));
}

#[test]
fn services_must_carry_every_required_cost_object() {
    let mut catalog = catalog();
    catalog
        .services
        .get_mut(&ServiceId::from("specialistVisit"))
        .expect("specialist service")
        .cost_tables
        .remove("costs_cdhp");

    let issues = issues_of(&catalog);
    assert!(issues.iter().any(|issue| {
        issue.contains("service 'specialistVisit'")
            && issue.contains("missing cost object 'costs_cdhp'")
    }));
}

#[test]
fn rule_field_constraints_are_enforced() {
    let mut catalog = catalog();
    let service = catalog
        .services
        .get_mut(&ServiceId::from("specialistVisit"))
        .expect("specialist service");
    service.coverage.insert(
        "PPO_300".into(),
        CoverageEntry::One(RawCoverageRule {
            copay: Some(40.0),
            coinsurance: Some(1.5),
            dollar_limit: Some(200.5),
            covered_count: Some(3.0),
            deductible: Some("whenever".to_string()),
            ..Default::default()
        }),
    );

    let issues = issues_of(&catalog);
    assert!(issues
        .iter()
        .any(|issue| issue.contains("coinsurance must be within [0, 1]")));
    assert!(issues
        .iter()
        .any(|issue| issue.contains("dollarLimit must be a whole number")));
    assert!(issues
        .iter()
        .any(|issue| issue.contains("coveredCount and dollarLimit are mutually exclusive")));
    assert!(issues
        .iter()
        .any(|issue| issue.contains("copay and dollarLimit are mutually exclusive")));
    assert!(issues
        .iter()
        .any(|issue| issue.contains("unknown deductible timing 'whenever'")));
}

#[test]
fn combined_limits_stay_out_of_rule_sequences() {
    let mut catalog = catalog();
    let service = catalog
        .services
        .get_mut(&ServiceId::from("physicalTherapyVisit"))
        .expect("physical therapy service");
    let CoverageEntry::Many(rules) = service
        .coverage
        .get_mut(&PlanId::from("PPO_300"))
        .expect("PPO coverage")
    else {
        panic!("physical therapy coverage should be a sequence");
    };
    rules[0].combined_limit_id = Some("chiropracticAnnualMax".into());
    rules[1].combined_limit_id = Some("rehabAnnualMax".into());

    let issues = issues_of(&catalog);
    assert!(issues
        .iter()
        .any(|issue| issue.contains("may not appear inside a rule sequence")));
    assert!(issues
        .iter()
        .any(|issue| issue.contains("unknown combined limit 'rehabAnnualMax'")));
}

#[test]
fn amount_maps_must_cover_every_coverage_level() {
    let mut catalog = catalog();
    let cdhp = catalog.plans.get_mut(&PlanId::from("CDHP")).expect("CDHP");
    cdhp.fund_amount_map
        .as_mut()
        .expect("fund amount map")
        .0
        .remove("employeeAndFamily");

    let issues = issues_of(&catalog);
    assert!(issues.iter().any(|issue| {
        issue.contains("fundAmountMap") && issue.contains("missing coverage level 'employeeAndFamily'")
    }));
}

#[test]
fn amount_map_keys_must_resolve() {
    let mut catalog = catalog();
    let cdhp = catalog.plans.get_mut(&PlanId::from("CDHP")).expect("CDHP");
    cdhp.fund_amount_map
        .as_mut()
        .expect("fund amount map")
        .0
        .insert("employeeSolo".to_string(), AmountMapNode::Amount(450.0));

    let issues = issues_of(&catalog);
    assert!(issues
        .iter()
        .any(|issue| issue.contains("key 'employeeSolo' is not a coverage level")));
}

#[test]
fn coverage_level_order_must_be_non_decreasing() {
    let mut catalog = catalog();
    catalog.coverage_levels_order.swap(0, 3);

    let issues = issues_of(&catalog);
    assert!(issues
        .iter()
        .any(|issue| issue.contains("breaks the non-decreasing")));
}

#[test]
fn issues_are_sorted_and_de_duplicated() {
    let mut catalog = catalog();
    catalog
        .regions
        .get_mut(&RegionId::from("CA"))
        .expect("CA region")
        .plans
        .push("ZZZ".into());
    catalog
        .regions
        .get_mut(&RegionId::from("AZ"))
        .expect("AZ region")
        .plans
        .extend(["AAA".into(), "AAA".into()]);

    let issues = issues_of(&catalog);
    let mut sorted = issues.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(issues, sorted);
    assert_eq!(
        issues
            .iter()
            .filter(|issue| issue.contains("unknown plan 'AAA'"))
            .count(),
        1
    );
}
