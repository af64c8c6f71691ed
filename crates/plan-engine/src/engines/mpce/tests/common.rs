use std::collections::BTreeMap;
use std::sync::Arc;

use crate::engines::mpce::blueprint::standard_catalog;
use crate::engines::mpce::domain::{BenefitsCatalog, GroupId, ServiceId};
use crate::engines::mpce::household::{Household, Utilization};
use crate::engines::mpce::markup::{ChargeRule, DeductibleTiming, PreparedCatalog};
use crate::engines::mpce::{CalculationRequest, PlanCostEngine};

pub(super) fn catalog() -> BenefitsCatalog {
    standard_catalog()
}

pub(super) fn prepared() -> PreparedCatalog {
    PreparedCatalog::prepare(standard_catalog()).expect("standard catalog is valid")
}

pub(super) fn engine() -> PlanCostEngine {
    PlanCostEngine::new(Arc::new(prepared()))
}

pub(super) fn utilization<const N: usize>(entries: [(&str, u32); N]) -> Utilization {
    entries
        .into_iter()
        .map(|(id, count)| (ServiceId::from(id), count))
        .collect()
}

pub(super) fn employee_only_request(
    region: &str,
    status: &str,
    primary: Utilization,
) -> CalculationRequest {
    CalculationRequest {
        region_id: region.into(),
        status_id: status.into(),
        household: Household {
            primary,
            spouse: None,
            children: Vec::new(),
        },
        plan_inputs: BTreeMap::new(),
    }
}

pub(super) fn family_request(
    region: &str,
    status: &str,
    primary: Utilization,
    spouse: Utilization,
    children: Vec<Utilization>,
) -> CalculationRequest {
    CalculationRequest {
        region_id: region.into(),
        status_id: status.into(),
        household: Household {
            primary,
            spouse: Some(spouse),
            children,
        },
        plan_inputs: BTreeMap::new(),
    }
}

/// A charge rule with nothing set; tests flip on the passes they exercise.
pub(super) fn base_charge() -> ChargeRule {
    ChargeRule {
        copay: None,
        coinsurance: None,
        coinsurance_min_dollar: None,
        coinsurance_max_dollar: None,
        coinsurance_towards_oop: true,
        copay_towards_oop: true,
        deductible: DeductibleTiming::None,
        covered_count: None,
        dollar_limit: None,
        single_use_cost_max: None,
        combined_limit_id: None,
        eligible_for_fund: false,
    }
}

pub(super) fn general() -> GroupId {
    GroupId::general()
}
