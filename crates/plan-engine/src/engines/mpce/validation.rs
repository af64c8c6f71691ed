//! Structural and referential validation of a benefits catalog. Issues are
//! collected without short-circuiting, then de-duplicated, sorted, and
//! surfaced as a single fatal [`ConfigurationError`]. Shape checks that a
//! statically-typed catalog makes unrepresentable (wrong node types, negative
//! counts) are enforced at deserialization and not re-checked here.

use std::collections::{BTreeMap, BTreeSet};

use super::domain::{
    AmountMap, AmountMapNode, BenefitsCatalog, CategoryId, CoverageLevelId, GroupId, LimitGroup,
    Plan, PlanId, PremiumNode, RawCoverageRule, RegionId, ServiceId, StatusId,
    CUSTOM_COSTS_OBJECT_PREFIX, DEDUCTIBLE_AFTER_COPAY, DEDUCTIBLE_BEFORE_COINSURANCE,
    DEDUCTIBLE_BEFORE_COPAY, DEDUCTIBLE_NONE, DEFAULT_COSTS_OBJECT_ID,
};
use crate::engines::ConfigurationError;

#[derive(Debug, Default)]
struct IssueList {
    issues: Vec<String>,
}

impl IssueList {
    fn push(&mut self, issue: impl Into<String>) {
        self.issues.push(issue.into());
    }

    fn into_result(self) -> Result<(), ConfigurationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::from_issues(self.issues))
        }
    }
}

/// Validate a catalog, reporting every discovered issue at once.
pub fn validate(catalog: &BenefitsCatalog) -> Result<(), ConfigurationError> {
    let mut issues = IssueList::default();

    check_order_agreement(&mut issues, "regions", catalog.regions.keys(), &catalog.regions_order);
    check_order_agreement(&mut issues, "plans", catalog.plans.keys(), &catalog.plans_order);
    check_order_agreement(
        &mut issues,
        "statuses",
        catalog.statuses.keys(),
        &catalog.statuses_order,
    );
    check_order_agreement(
        &mut issues,
        "coverageLevels",
        catalog.coverage_levels.keys(),
        &catalog.coverage_levels_order,
    );
    check_order_agreement(
        &mut issues,
        "categories",
        catalog.categories.keys(),
        &catalog.categories_order,
    );
    check_order_agreement(
        &mut issues,
        "combinedLimits",
        catalog.combined_limits.keys(),
        &catalog.combined_limits_order,
    );
    check_order_agreement(
        &mut issues,
        "healthStatuses",
        catalog.health_statuses.keys(),
        &catalog.health_statuses_order,
    );

    check_coverage_level_ordering(&mut issues, catalog);
    check_regions(&mut issues, catalog);
    check_category_partition(&mut issues, catalog);
    check_combined_limits(&mut issues, catalog);
    check_plans(&mut issues, catalog);
    check_services(&mut issues, catalog);
    check_premium_tables(&mut issues, catalog);
    check_health_statuses(&mut issues, catalog);

    issues.into_result()
}

fn check_order_agreement<'a, K>(
    issues: &mut IssueList,
    label: &str,
    keys: impl Iterator<Item = &'a K>,
    order: &'a [K],
) where
    K: std::fmt::Display + Ord + 'a,
{
    let key_set: BTreeSet<&K> = keys.collect();
    let mut seen: BTreeSet<&K> = BTreeSet::new();

    for id in order {
        if !seen.insert(id) {
            issues.push(format!("{label}Order: duplicate id '{id}'"));
        }
        if !key_set.contains(id) {
            issues.push(format!("{label}Order: id '{id}' is not defined in {label}"));
        }
    }
    for id in &key_set {
        if !seen.contains(*id) {
            issues.push(format!("{label}: id '{id}' is missing from {label}Order"));
        }
    }
}

fn check_coverage_level_ordering(issues: &mut IssueList, catalog: &BenefitsCatalog) {
    let mut previous: Option<(bool, u64)> = None;
    for level_id in &catalog.coverage_levels_order {
        let Some(level) = catalog.coverage_levels.get(level_id) else {
            continue;
        };
        let key = (level.spouse, level.child_capacity());
        if let Some(prev) = previous {
            if key < prev {
                issues.push(format!(
                    "coverageLevelsOrder: '{level_id}' breaks the non-decreasing \
                     (spouse, maxNumChildren) ordering"
                ));
            }
        }
        previous = Some(key);
    }
}

fn check_regions(issues: &mut IssueList, catalog: &BenefitsCatalog) {
    for (region_id, region) in &catalog.regions {
        for plan_id in &region.plans {
            if !catalog.plans.contains_key(plan_id) {
                issues.push(format!("region '{region_id}': unknown plan '{plan_id}'"));
            }
        }
    }
}

fn check_category_partition(issues: &mut IssueList, catalog: &BenefitsCatalog) {
    let mut claimed: BTreeMap<&ServiceId, &CategoryId> = BTreeMap::new();
    for (category_id, category) in &catalog.categories {
        for service_id in &category.ordered_contents {
            if !catalog.services.contains_key(service_id) {
                issues.push(format!(
                    "category '{category_id}': unknown service '{service_id}'"
                ));
                continue;
            }
            if let Some(other) = claimed.insert(service_id, category_id) {
                issues.push(format!(
                    "service '{service_id}' appears in categories '{other}' and '{category_id}'"
                ));
            }
        }
    }
    for service_id in catalog.services.keys() {
        if !claimed.contains_key(service_id) {
            issues.push(format!("service '{service_id}' belongs to no category"));
        }
    }
}

fn check_combined_limits(issues: &mut IssueList, catalog: &BenefitsCatalog) {
    for (limit_id, limit) in &catalog.combined_limits {
        if limit.person_reimburse_limit.is_none() && limit.family_reimburse_limit.is_none() {
            issues.push(format!(
                "combinedLimit '{limit_id}': neither personReimburseLimit nor \
                 familyReimburseLimit is set"
            ));
        }
        for (field, value) in [
            ("personReimburseLimit", limit.person_reimburse_limit),
            ("familyReimburseLimit", limit.family_reimburse_limit),
        ] {
            if let Some(amount) = value {
                if amount < 0.0 {
                    issues.push(format!("combinedLimit '{limit_id}': {field} is negative"));
                }
            }
        }
    }
}

fn check_plans(issues: &mut IssueList, catalog: &BenefitsCatalog) {
    for (plan_id, plan) in &catalog.plans {
        let costs_object_id = plan.costs_object_id();
        if costs_object_id != DEFAULT_COSTS_OBJECT_ID
            && !costs_object_id.starts_with(CUSTOM_COSTS_OBJECT_PREFIX)
        {
            issues.push(format!(
                "plan '{plan_id}': costsObjectId '{costs_object_id}' must be \
                 '{DEFAULT_COSTS_OBJECT_ID}' or start with '{CUSTOM_COSTS_OBJECT_PREFIX}'"
            ));
        }

        for (family, groups) in limit_families(plan) {
            let Some(groups) = groups else { continue };
            check_limit_family(issues, catalog, plan_id, family, groups);
        }

        if let Some(fund_map) = &plan.fund_amount_map {
            check_amount_map(
                issues,
                catalog,
                &format!("plan '{plan_id}': fundAmountMap"),
                fund_map,
            );
        }

        if let Some(fund_categories) = &plan.categories_fund_applies_to {
            for category_id in fund_categories.keys() {
                if !catalog.categories.contains_key(category_id) {
                    issues.push(format!(
                        "plan '{plan_id}': categoriesFundAppliesTo names unknown \
                         category '{category_id}'"
                    ));
                }
            }
        }
    }
}

pub(crate) fn limit_families(
    plan: &Plan,
) -> [(&'static str, Option<&BTreeMap<GroupId, LimitGroup>>); 4] {
    [
        ("personDeductibles", plan.person_deductibles.as_ref()),
        ("familyDeductibles", plan.family_deductibles.as_ref()),
        (
            "personOutOfPocketMaximums",
            plan.person_out_of_pocket_maximums.as_ref(),
        ),
        (
            "familyOutOfPocketMaximums",
            plan.family_out_of_pocket_maximums.as_ref(),
        ),
    ]
}

fn check_limit_family(
    issues: &mut IssueList,
    catalog: &BenefitsCatalog,
    plan_id: &PlanId,
    family: &str,
    groups: &BTreeMap<GroupId, LimitGroup>,
) {
    let context = format!("plan '{plan_id}': {family}");

    match groups.get(&GroupId::general()) {
        None => issues.push(format!("{context}: missing the 'general' group")),
        Some(general) => {
            if general.categories.is_some() {
                issues.push(format!(
                    "{context}: the 'general' group may not carry a categories subset"
                ));
            }
        }
    }

    let mut claimed: BTreeMap<&CategoryId, &GroupId> = BTreeMap::new();
    for (group_id, group) in groups {
        if !group_id.is_general() {
            match &group.categories {
                None => issues.push(format!(
                    "{context}: group '{group_id}' names no categories"
                )),
                Some(categories) if categories.is_empty() => issues.push(format!(
                    "{context}: group '{group_id}' names no categories"
                )),
                Some(categories) => {
                    for category_id in categories {
                        if !catalog.categories.contains_key(category_id) {
                            issues.push(format!(
                                "{context}: group '{group_id}' names unknown \
                                 category '{category_id}'"
                            ));
                        }
                        if let Some(other) = claimed.insert(category_id, group_id) {
                            issues.push(format!(
                                "{context}: category '{category_id}' is claimed by \
                                 groups '{other}' and '{group_id}'"
                            ));
                        }
                    }
                }
            }
        }

        let group_context = format!("{context}.{group_id}");
        match (group.amount, &group.amount_map) {
            (None, None) => issues.push(format!(
                "{group_context}: neither amount nor amountMap is set"
            )),
            (Some(_), Some(_)) => issues.push(format!(
                "{group_context}: amount and amountMap are mutually exclusive"
            )),
            (Some(amount), None) => {
                if amount < 0.0 {
                    issues.push(format!("{group_context}: amount is negative"));
                }
            }
            (None, Some(map)) => check_amount_map(issues, catalog, &group_context, map),
        }
    }
}

fn check_amount_map(
    issues: &mut IssueList,
    catalog: &BenefitsCatalog,
    context: &str,
    map: &AmountMap,
) {
    for (key, node) in &map.0 {
        let is_region = catalog.regions.contains_key(&RegionId::from(key.as_str()));
        let is_status = catalog.statuses.contains_key(&StatusId::from(key.as_str()));
        let is_level = catalog
            .coverage_levels
            .contains_key(&CoverageLevelId::from(key.as_str()));

        match node {
            AmountMapNode::Amount(amount) => {
                if !is_level {
                    issues.push(format!(
                        "{context}: key '{key}' is not a coverage level"
                    ));
                }
                if *amount < 0.0 {
                    issues.push(format!("{context}: amount for '{key}' is negative"));
                }
            }
            AmountMapNode::ByCoverageLevel(by_level) => {
                if !is_region && !is_status {
                    issues.push(format!(
                        "{context}: key '{key}' is neither a region nor a status"
                    ));
                }
                for (level_id, amount) in by_level {
                    if !catalog.coverage_levels.contains_key(level_id) {
                        issues.push(format!(
                            "{context}: '{key}' names unknown coverage level '{level_id}'"
                        ));
                    }
                    if *amount < 0.0 {
                        issues.push(format!(
                            "{context}: amount for '{key}.{level_id}' is negative"
                        ));
                    }
                }
                for level_id in catalog.coverage_levels.keys() {
                    if !by_level.contains_key(level_id) {
                        issues.push(format!(
                            "{context}: '{key}' is missing coverage level '{level_id}'"
                        ));
                    }
                }
            }
        }
    }

    // A map made only of nested branches still needs direct entries (or a
    // branch) to resolve every coverage level; the per-branch completeness
    // check above covers branches, and direct-shape maps are checked here.
    let direct_levels: BTreeSet<&str> = map
        .0
        .iter()
        .filter_map(|(key, node)| match node {
            AmountMapNode::Amount(_) => Some(key.as_str()),
            AmountMapNode::ByCoverageLevel(_) => None,
        })
        .collect();
    let has_branches = map
        .0
        .values()
        .any(|node| matches!(node, AmountMapNode::ByCoverageLevel(_)));
    if !has_branches {
        for level_id in catalog.coverage_levels.keys() {
            if !direct_levels.contains(level_id.as_str()) {
                issues.push(format!(
                    "{context}: missing coverage level '{level_id}'"
                ));
            }
        }
    }
}

fn check_services(issues: &mut IssueList, catalog: &BenefitsCatalog) {
    // Cost objects any plan requires, with the plans that require them.
    let mut required_cost_objects: BTreeMap<&str, &PlanId> = BTreeMap::new();
    for (plan_id, plan) in &catalog.plans {
        required_cost_objects
            .entry(plan.costs_object_id())
            .or_insert(plan_id);
    }

    for (service_id, service) in &catalog.services {
        let context = format!("service '{service_id}'");

        for plan_id in service.coverage.keys() {
            if !catalog.plans.contains_key(plan_id) {
                issues.push(format!("{context}: coverage names unknown plan '{plan_id}'"));
            }
        }
        for plan_id in catalog.plans.keys() {
            if !service.coverage.contains_key(plan_id) {
                issues.push(format!(
                    "{context}: no coverage is defined for plan '{plan_id}'"
                ));
            }
        }

        for (costs_object_id, by_region) in &service.cost_tables {
            if !costs_object_id.starts_with(DEFAULT_COSTS_OBJECT_ID) {
                issues.push(format!(
                    "{context}: unexpected field '{costs_object_id}'"
                ));
                continue;
            }
            for (region_id, cost) in by_region {
                if !catalog.regions.contains_key(region_id) {
                    issues.push(format!(
                        "{context}: {costs_object_id} names unknown region '{region_id}'"
                    ));
                }
                if *cost <= 0.0 {
                    issues.push(format!(
                        "{context}: {costs_object_id}.{region_id} must be positive"
                    ));
                }
            }
        }

        for (costs_object_id, plan_id) in &required_cost_objects {
            match service.cost_tables.get(*costs_object_id) {
                None => issues.push(format!(
                    "{context}: missing cost object '{costs_object_id}' required by \
                     plan '{plan_id}'"
                )),
                Some(by_region) => {
                    for region_id in catalog.regions.keys() {
                        if !by_region.contains_key(region_id) {
                            issues.push(format!(
                                "{context}: {costs_object_id} is missing region '{region_id}'"
                            ));
                        }
                    }
                }
            }
        }

        for (plan_id, entry) in &service.coverage {
            let rules = entry.rules();
            if rules.is_empty() {
                issues.push(format!(
                    "{context}: coverage for plan '{plan_id}' is an empty sequence"
                ));
            }
            for rule in rules {
                check_rule(issues, catalog, &context, plan_id, rule, rules.len() > 1);
            }
        }
    }
}

fn check_rule(
    issues: &mut IssueList,
    catalog: &BenefitsCatalog,
    service_context: &str,
    plan_id: &PlanId,
    rule: &RawCoverageRule,
    in_sequence: bool,
) {
    let context = format!("{service_context}: coverage for plan '{plan_id}'");

    if rule.not_covered == Some(false) {
        issues.push(format!("{context}: notCovered must be true when present"));
    }

    if let Some(coinsurance) = rule.coinsurance {
        if !(0.0..=1.0).contains(&coinsurance) {
            issues.push(format!("{context}: coinsurance must be within [0, 1]"));
        }
    }

    for (field, value) in [
        ("copay", rule.copay),
        ("coinsuranceMinDollar", rule.coinsurance_min_dollar),
        ("coinsuranceMaxDollar", rule.coinsurance_max_dollar),
        ("singleUseCostMax", rule.single_use_cost_max),
        ("coveredCount", rule.covered_count),
        ("dollarLimit", rule.dollar_limit),
    ] {
        if let Some(amount) = value {
            if amount < 0.0 {
                issues.push(format!("{context}: {field} is negative"));
            }
        }
    }

    for (field, value) in [
        ("coveredCount", rule.covered_count),
        ("dollarLimit", rule.dollar_limit),
    ] {
        if let Some(amount) = value {
            if amount.fract() != 0.0 {
                issues.push(format!("{context}: {field} must be a whole number"));
            }
        }
    }

    if rule.covered_count.is_some() && rule.dollar_limit.is_some() {
        issues.push(format!(
            "{context}: coveredCount and dollarLimit are mutually exclusive"
        ));
    }
    if rule.copay.is_some() && rule.dollar_limit.is_some() {
        issues.push(format!(
            "{context}: copay and dollarLimit are mutually exclusive"
        ));
    }
    if rule.dollar_limit.is_some() && rule.coinsurance.is_none() {
        issues.push(format!(
            "{context}: dollarLimit applies only to coinsurance rules"
        ));
    }

    if let Some(timing) = rule.deductible.as_deref() {
        if ![
            DEDUCTIBLE_NONE,
            DEDUCTIBLE_BEFORE_COPAY,
            DEDUCTIBLE_AFTER_COPAY,
            DEDUCTIBLE_BEFORE_COINSURANCE,
        ]
        .contains(&timing)
        {
            issues.push(format!("{context}: unknown deductible timing '{timing}'"));
        }
    }

    if let Some(limit_id) = &rule.combined_limit_id {
        if !catalog.combined_limits.contains_key(limit_id) {
            issues.push(format!(
                "{context}: unknown combined limit '{limit_id}'"
            ));
        }
        if in_sequence {
            issues.push(format!(
                "{context}: combinedLimitId may not appear inside a rule sequence"
            ));
        }
    }
}

fn check_premium_tables(issues: &mut IssueList, catalog: &BenefitsCatalog) {
    for (plan_id, table) in &catalog.coverage_level_costs_per_plan {
        let context = format!("coverageLevelCostsPerPlan '{plan_id}'");
        if !catalog.plans.contains_key(plan_id) {
            issues.push(format!("{context}: unknown plan"));
        }

        for (key, node) in &table.0 {
            match node {
                PremiumNode::ByStatus(by_status) => {
                    if !catalog
                        .coverage_levels
                        .contains_key(&CoverageLevelId::from(key.as_str()))
                    {
                        issues.push(format!(
                            "{context}: key '{key}' is not a coverage level"
                        ));
                    }
                    check_premium_statuses(issues, catalog, &context, key, by_status);
                }
                PremiumNode::ByCoverageLevel(by_level) => {
                    if !catalog.regions.contains_key(&RegionId::from(key.as_str())) {
                        issues.push(format!("{context}: key '{key}' is not a region"));
                    }
                    for (level_id, by_status) in by_level {
                        if !catalog.coverage_levels.contains_key(level_id) {
                            issues.push(format!(
                                "{context}: '{key}' names unknown coverage level '{level_id}'"
                            ));
                        }
                        check_premium_statuses(
                            issues,
                            catalog,
                            &context,
                            &format!("{key}.{level_id}"),
                            by_status,
                        );
                    }
                }
            }
        }
    }
}

fn check_premium_statuses(
    issues: &mut IssueList,
    catalog: &BenefitsCatalog,
    context: &str,
    key: &str,
    by_status: &BTreeMap<StatusId, Option<f64>>,
) {
    for (status_id, premium) in by_status {
        if !catalog.statuses.contains_key(status_id) {
            issues.push(format!(
                "{context}: '{key}' names unknown status '{status_id}'"
            ));
        }
        if let Some(amount) = premium {
            if *amount < 0.0 {
                issues.push(format!(
                    "{context}: premium for '{key}.{status_id}' is negative"
                ));
            }
        }
    }
}

fn check_health_statuses(issues: &mut IssueList, catalog: &BenefitsCatalog) {
    for (preset_id, preset) in &catalog.health_statuses {
        for service_id in preset.contents.keys() {
            if !catalog.services.contains_key(service_id) {
                issues.push(format!(
                    "healthStatus '{preset_id}': unknown service '{service_id}'"
                ));
            }
        }
    }
}
