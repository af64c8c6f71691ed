use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{BenefitsCatalog, CoverageLevelId, ServiceId};
use super::engine::CalculationError;

/// Annual utilization for one household member: service -> count. Absent
/// entries are zero.
pub type Utilization = BTreeMap<ServiceId, u32>;

/// The household being quoted. Member evaluation order is always
/// `[primary, spouse, children...]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    pub primary: Utilization,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse: Option<Utilization>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Utilization>,
}

impl Household {
    pub fn members(&self) -> Vec<&Utilization> {
        let mut members = vec![&self.primary];
        if let Some(spouse) = &self.spouse {
            members.push(spouse);
        }
        members.extend(self.children.iter());
        members
    }
}

/// Pick the narrowest coverage tier that accommodates the household: the
/// first level in order whose spouse flag and child capacity both suffice.
/// Relies on `coverageLevelsOrder` being non-decreasing in
/// `(spouse, maxNumChildren)`, which the validator enforces.
pub fn resolve_coverage_level<'a>(
    catalog: &'a BenefitsCatalog,
    has_spouse: bool,
    num_children: usize,
) -> Result<&'a CoverageLevelId, CalculationError> {
    for level_id in &catalog.coverage_levels_order {
        let Some(level) = catalog.coverage_levels.get(level_id) else {
            continue;
        };
        let spouse_fits = level.spouse || !has_spouse;
        let children_fit = level.child_capacity() >= num_children as u64;
        if spouse_fits && children_fit {
            return Ok(level_id);
        }
    }
    Err(CalculationError::HouseholdNotCovered {
        spouse: has_spouse,
        children: num_children,
    })
}
