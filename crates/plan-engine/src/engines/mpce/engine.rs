use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::domain::{CoverageLevelId, PlanId, RegionId, StatusId};
use super::household::{resolve_coverage_level, Household};
use super::markup::PreparedCatalog;
use super::plan::{evaluate_plan, PlanInputs, PlanResult};

/// Call errors: unknown identifiers or a household the coverage-level table
/// cannot represent. Fatal to the call; the engine never partially returns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculationError {
    #[error("unknown region '{0}'")]
    UnknownRegion(RegionId),
    #[error("unknown employment status '{0}'")]
    UnknownStatus(StatusId),
    #[error(
        "no coverage level accommodates a household with spouse={spouse} and {children} children"
    )]
    HouseholdNotCovered { spouse: bool, children: usize },
}

/// One cost estimate request: where and who, plus optional per-plan fund and
/// premium adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    pub region_id: RegionId,
    pub status_id: StatusId,
    #[serde(flatten)]
    pub household: Household,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub plan_inputs: BTreeMap<PlanId, PlanInputs>,
}

/// Ordered per-plan results plus the resolved tier and measured elapsed
/// time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationOutcome {
    pub coverage_level_id: CoverageLevelId,
    pub results: Vec<PlanResult>,
    pub elapsed_msec: f64,
}

/// The medical plan cost engine: a pure function of the prepared catalog
/// and the request, safe to share across threads.
#[derive(Debug)]
pub struct PlanCostEngine {
    prepared: Arc<PreparedCatalog>,
}

impl PlanCostEngine {
    pub fn new(prepared: Arc<PreparedCatalog>) -> Self {
        Self { prepared }
    }

    pub fn catalog(&self) -> &PreparedCatalog {
        &self.prepared
    }

    /// Estimate year-end costs under every plan offered in the requested
    /// region, in region plan order.
    pub fn calculate(
        &self,
        request: &CalculationRequest,
    ) -> Result<CalculationOutcome, CalculationError> {
        let started = Instant::now();
        let catalog = self.prepared.catalog();

        let region = catalog
            .regions
            .get(&request.region_id)
            .ok_or_else(|| CalculationError::UnknownRegion(request.region_id.clone()))?;
        if !catalog.statuses.contains_key(&request.status_id) {
            return Err(CalculationError::UnknownStatus(request.status_id.clone()));
        }

        let coverage_level_id = resolve_coverage_level(
            catalog,
            request.household.spouse.is_some(),
            request.household.children.len(),
        )?
        .clone();

        let default_inputs = PlanInputs::default();
        let results: Vec<PlanResult> = region
            .plans
            .iter()
            .map(|plan_id| {
                let inputs = request.plan_inputs.get(plan_id).unwrap_or(&default_inputs);
                evaluate_plan(
                    &self.prepared,
                    plan_id,
                    &request.region_id,
                    &request.status_id,
                    &coverage_level_id,
                    &request.household,
                    inputs,
                )
            })
            .collect();

        let elapsed_msec = started.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(
            region = %request.region_id,
            status = %request.status_id,
            coverage_level = %coverage_level_id,
            plans = results.len(),
            elapsed_msec,
            "plan cost calculation complete"
        );

        Ok(CalculationOutcome {
            coverage_level_id,
            results,
            elapsed_msec,
        })
    }
}
