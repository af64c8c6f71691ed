//! One-time derivation of the lookup tables the evaluators run on: the
//! service -> category inversion, normalized coverage rule sequences, the
//! per-plan deductible-first service ordering, and the per-plan
//! category -> limit-group maps. Preparation validates first and never
//! mutates the input catalog; preparing the same catalog twice yields an
//! equal value.

use std::collections::BTreeMap;

use super::domain::{
    BenefitsCatalog, CategoryId, CombinedLimitId, GroupId, LimitGroup, PlanId, RawCoverageRule,
    ServiceId, DEDUCTIBLE_BEFORE_COPAY, DEDUCTIBLE_NONE,
};
use super::validation;
use crate::engines::ConfigurationError;

/// When the deductible is collected relative to the other passes.
/// `afterCopay` and `beforeCoinsurance` are synonyms and collapse here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeductibleTiming {
    None,
    BeforeCopay,
    #[default]
    BeforeCoinsurance,
}

/// A coverage rule in evaluable form.
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageRule {
    NotCovered {
        eligible_for_fund: bool,
    },
    Charge(ChargeRule),
}

impl CoverageRule {
    pub fn eligible_for_fund(&self) -> bool {
        match self {
            CoverageRule::NotCovered { eligible_for_fund } => *eligible_for_fund,
            CoverageRule::Charge(charge) => charge.eligible_for_fund,
        }
    }

    fn has_deductible(&self) -> bool {
        matches!(
            self,
            CoverageRule::Charge(ChargeRule {
                deductible: DeductibleTiming::BeforeCopay | DeductibleTiming::BeforeCoinsurance,
                ..
            })
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRule {
    pub copay: Option<f64>,
    pub coinsurance: Option<f64>,
    pub coinsurance_min_dollar: Option<f64>,
    pub coinsurance_max_dollar: Option<f64>,
    pub coinsurance_towards_oop: bool,
    pub copay_towards_oop: bool,
    pub deductible: DeductibleTiming,
    pub covered_count: Option<u32>,
    pub dollar_limit: Option<f64>,
    pub single_use_cost_max: Option<f64>,
    pub combined_limit_id: Option<CombinedLimitId>,
    pub eligible_for_fund: bool,
}

/// Per-plan derived tables.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanTables {
    pub coverage: BTreeMap<ServiceId, Vec<CoverageRule>>,
    /// Services whose coverage carries any deductible, in canonical order.
    /// Evaluated before `services_no_deductible` so deductible-bearing
    /// services consume the shared deductible budget before zero-deductible
    /// services compete for the shared out-of-pocket ceiling.
    pub services_with_deductible: Vec<ServiceId>,
    pub services_no_deductible: Vec<ServiceId>,
    pub person_deductible_group: BTreeMap<CategoryId, GroupId>,
    pub family_deductible_group: BTreeMap<CategoryId, GroupId>,
    pub person_oop_group: BTreeMap<CategoryId, GroupId>,
    pub family_oop_group: BTreeMap<CategoryId, GroupId>,
    pub costs_object_id: String,
}

/// A validated catalog plus every marker-derived table, ready for
/// evaluation. Immutable once built; cheap to share read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCatalog {
    catalog: BenefitsCatalog,
    service_categories: BTreeMap<ServiceId, CategoryId>,
    plan_tables: BTreeMap<PlanId, PlanTables>,
}

impl PreparedCatalog {
    /// Validate the catalog and derive the evaluation tables.
    pub fn prepare(catalog: BenefitsCatalog) -> Result<Self, ConfigurationError> {
        validation::validate(&catalog)?;

        let mut service_categories = BTreeMap::new();
        for (category_id, category) in &catalog.categories {
            for service_id in &category.ordered_contents {
                service_categories.insert(service_id.clone(), category_id.clone());
            }
        }

        let ordered_services = catalog.ordered_service_ids();
        let mut plan_tables = BTreeMap::new();
        for (plan_id, plan) in &catalog.plans {
            let mut coverage = BTreeMap::new();
            let mut with_deductible = Vec::new();
            let mut no_deductible = Vec::new();

            for service_id in &ordered_services {
                let Some(service) = catalog.services.get(service_id) else {
                    continue;
                };
                let Some(entry) = service.coverage.get(plan_id) else {
                    continue;
                };
                let category_id = &service_categories[service_id];
                let fund_default = plan
                    .categories_fund_applies_to
                    .as_ref()
                    .and_then(|by_category| by_category.get(category_id))
                    .copied()
                    .unwrap_or(false);

                let rules: Vec<CoverageRule> = entry
                    .rules()
                    .iter()
                    .map(|raw| normalize_rule(raw, fund_default))
                    .collect();

                if rules.iter().any(CoverageRule::has_deductible) {
                    with_deductible.push(service_id.clone());
                } else {
                    no_deductible.push(service_id.clone());
                }
                coverage.insert(service_id.clone(), rules);
            }

            plan_tables.insert(
                plan_id.clone(),
                PlanTables {
                    coverage,
                    services_with_deductible: with_deductible,
                    services_no_deductible: no_deductible,
                    person_deductible_group: group_assignments(
                        &catalog,
                        plan.person_deductibles.as_ref(),
                    ),
                    family_deductible_group: group_assignments(
                        &catalog,
                        plan.family_deductibles.as_ref(),
                    ),
                    person_oop_group: group_assignments(
                        &catalog,
                        plan.person_out_of_pocket_maximums.as_ref(),
                    ),
                    family_oop_group: group_assignments(
                        &catalog,
                        plan.family_out_of_pocket_maximums.as_ref(),
                    ),
                    costs_object_id: plan.costs_object_id().to_string(),
                },
            );
        }

        Ok(Self {
            catalog,
            service_categories,
            plan_tables,
        })
    }

    pub fn catalog(&self) -> &BenefitsCatalog {
        &self.catalog
    }

    pub fn service_category(&self, service_id: &ServiceId) -> &CategoryId {
        &self.service_categories[service_id]
    }

    pub(crate) fn plan_tables(&self, plan_id: &PlanId) -> &PlanTables {
        &self.plan_tables[plan_id]
    }
}

/// Map every category to its limit group within one family, defaulting to
/// `general` and overridden for categories a named group claims.
fn group_assignments(
    catalog: &BenefitsCatalog,
    groups: Option<&BTreeMap<GroupId, LimitGroup>>,
) -> BTreeMap<CategoryId, GroupId> {
    let mut assignments: BTreeMap<CategoryId, GroupId> = catalog
        .categories
        .keys()
        .map(|category_id| (category_id.clone(), GroupId::general()))
        .collect();

    if let Some(groups) = groups {
        for (group_id, group) in groups {
            if group_id.is_general() {
                continue;
            }
            if let Some(categories) = &group.categories {
                for category_id in categories {
                    assignments.insert(category_id.clone(), group_id.clone());
                }
            }
        }
    }

    assignments
}

fn normalize_rule(raw: &RawCoverageRule, fund_default: bool) -> CoverageRule {
    let eligible_for_fund = raw.eligible_for_fund.unwrap_or(fund_default);

    if raw.not_covered == Some(true) {
        return CoverageRule::NotCovered { eligible_for_fund };
    }

    let deductible = match raw.deductible.as_deref() {
        Some(DEDUCTIBLE_NONE) => DeductibleTiming::None,
        Some(DEDUCTIBLE_BEFORE_COPAY) => DeductibleTiming::BeforeCopay,
        _ => DeductibleTiming::BeforeCoinsurance,
    };

    CoverageRule::Charge(ChargeRule {
        copay: raw.copay,
        coinsurance: raw.coinsurance,
        coinsurance_min_dollar: raw.coinsurance_min_dollar,
        coinsurance_max_dollar: raw.coinsurance_max_dollar,
        coinsurance_towards_oop: raw.coinsurance_not_towards_oop_max != Some(true),
        copay_towards_oop: raw.copay_not_towards_oop_max != Some(true),
        deductible,
        covered_count: raw.covered_count.map(|count| count as u32),
        dollar_limit: raw.dollar_limit,
        single_use_cost_max: raw.single_use_cost_max,
        combined_limit_id: raw.combined_limit_id.clone(),
        eligible_for_fund,
    })
}
