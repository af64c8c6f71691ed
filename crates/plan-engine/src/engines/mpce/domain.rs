use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

identifier!(
    /// Identifier wrapper for geographic rating regions.
    RegionId
);
identifier!(
    /// Identifier wrapper for medical plans.
    PlanId
);
identifier!(
    /// Identifier wrapper for employment statuses.
    StatusId
);
identifier!(
    /// Identifier wrapper for coverage tiers.
    CoverageLevelId
);
identifier!(
    /// Identifier wrapper for medical services.
    ServiceId
);
identifier!(
    /// Identifier wrapper for service categories.
    CategoryId
);
identifier!(
    /// Identifier wrapper for deductible / out-of-pocket limit groups.
    GroupId
);
identifier!(
    /// Identifier wrapper for combined reimbursement limits.
    CombinedLimitId
);
identifier!(
    /// Identifier wrapper for utilization presets.
    HealthStatusId
);

impl GroupId {
    /// The catch-all group every limit family falls back to.
    pub fn general() -> Self {
        Self("general".to_string())
    }

    pub fn is_general(&self) -> bool {
        self.0 == "general"
    }
}

/// Display text that is either plain or keyed by language code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Text {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl Text {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain(text.into())
    }

    /// Resolve to a single display string, preferring English.
    pub fn resolve(&self) -> &str {
        match self {
            Text::Plain(text) => text,
            Text::Localized(by_language) => by_language
                .get("en")
                .or_else(|| by_language.values().next())
                .map(String::as_str)
                .unwrap_or(""),
        }
    }
}

/// Amount lookup keyed by coverage level, optionally nested under a region or
/// an employment status. Resolution prefers region, then status, then the
/// direct coverage-level entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AmountMap(pub BTreeMap<String, AmountMapNode>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountMapNode {
    Amount(f64),
    ByCoverageLevel(BTreeMap<CoverageLevelId, f64>),
}

/// One named budget within a deductible or out-of-pocket family. The
/// `general` group carries no category subset; every other group names the
/// disjoint categories it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeSet<CategoryId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_map: Option<AmountMap>,
}

/// A single medical plan: its limit families, fund settings, and the cost
/// table it consults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub description: Text,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_deductibles: Option<BTreeMap<GroupId, LimitGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_deductibles: Option<BTreeMap<GroupId, LimitGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_out_of_pocket_maximums: Option<BTreeMap<GroupId, LimitGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_out_of_pocket_maximums: Option<BTreeMap<GroupId, LimitGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_amount_map: Option<AmountMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories_fund_applies_to: Option<BTreeMap<CategoryId, bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_allows_contributions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs_object_id: Option<String>,
}

pub const DEFAULT_COSTS_OBJECT_ID: &str = "costs";
pub const CUSTOM_COSTS_OBJECT_PREFIX: &str = "costs_";

impl Plan {
    pub fn costs_object_id(&self) -> &str {
        self.costs_object_id
            .as_deref()
            .unwrap_or(DEFAULT_COSTS_OBJECT_ID)
    }
}

/// A geographic rating region and the plans offered in it, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub description: Text,
    pub plans: Vec<PlanId>,
}

/// An employment status (full-time, part-time, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentStatus {
    pub description: Text,
}

/// A coverage tier determined by household composition. `max_num_children`
/// of `None` means the tier covers any number of children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageLevel {
    pub description: Text,
    pub spouse: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_num_children: Option<u32>,
}

impl CoverageLevel {
    pub(crate) fn child_capacity(&self) -> u64 {
        self.max_num_children.map(u64::from).unwrap_or(u64::MAX)
    }
}

/// A cap on total plan reimbursement shared by every service tied to it,
/// independent of deductibles and out-of-pocket maxima.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedLimit {
    pub description: Text,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_reimburse_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_reimburse_limit: Option<f64>,
}

/// A named subset of services; `ordered_contents` is the authoritative
/// iteration order for the services it contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCategory {
    pub description: Text,
    pub ordered_contents: Vec<ServiceId>,
}

/// A named utilization preset mapping services to annual counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub description: Text,
    pub contents: BTreeMap<ServiceId, u32>,
}

/// Raw coverage rule exactly as configured. Normalization into the
/// evaluable shape happens when the catalog is prepared.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCoverageRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_covered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinsurance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinsurance_min_dollar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinsurance_max_dollar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinsurance_not_towards_oop_max: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copay_not_towards_oop_max: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deductible: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covered_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dollar_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_use_cost_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_limit_id: Option<CombinedLimitId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligible_for_fund: Option<bool>,
}

pub const DEDUCTIBLE_NONE: &str = "none";
pub const DEDUCTIBLE_BEFORE_COPAY: &str = "beforeCopay";
pub const DEDUCTIBLE_AFTER_COPAY: &str = "afterCopay";
pub const DEDUCTIBLE_BEFORE_COINSURANCE: &str = "beforeCoinsurance";

/// A plan's coverage of one service: a single rule or an ordered sequence
/// applied in turn as units are consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoverageEntry {
    One(RawCoverageRule),
    Many(Vec<RawCoverageRule>),
}

impl CoverageEntry {
    pub fn rules(&self) -> &[RawCoverageRule] {
        match self {
            CoverageEntry::One(rule) => std::slice::from_ref(rule),
            CoverageEntry::Many(rules) => rules,
        }
    }
}

/// One billable medical service. Cost tables are keyed by costs-object id
/// (`costs` by default, `costs_*` for plan-specific negotiated tables) and
/// then by region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalService {
    pub description: Text,
    pub coverage: BTreeMap<PlanId, CoverageEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs_for_display: Option<String>,
    #[serde(flatten)]
    pub cost_tables: BTreeMap<String, BTreeMap<RegionId, f64>>,
}

/// Service ids starting with this prefix carry raw dollars of additional
/// spend: an event of (count=N, cost=1) is read as one event costing N.
pub const ADDITIONAL_SERVICES_PREFIX: &str = "additionalServices";

/// Annual premium lookup: either coverage-level -> status -> amount, or
/// region -> coverage-level -> status -> amount. `None` marks a tier the
/// plan is not offered at.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PremiumTable(pub BTreeMap<String, PremiumNode>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PremiumNode {
    ByStatus(BTreeMap<StatusId, Option<f64>>),
    ByCoverageLevel(BTreeMap<CoverageLevelId, BTreeMap<StatusId, Option<f64>>>),
}

/// The full benefits catalog: every named collection plus its explicit
/// ordering sequence. Iteration order is always taken from the order
/// sequences, never from the maps themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitsCatalog {
    pub regions: BTreeMap<RegionId, Region>,
    pub regions_order: Vec<RegionId>,
    pub plans: BTreeMap<PlanId, Plan>,
    pub plans_order: Vec<PlanId>,
    pub statuses: BTreeMap<StatusId, EmploymentStatus>,
    pub statuses_order: Vec<StatusId>,
    pub coverage_levels: BTreeMap<CoverageLevelId, CoverageLevel>,
    pub coverage_levels_order: Vec<CoverageLevelId>,
    pub categories: BTreeMap<CategoryId, ServiceCategory>,
    pub categories_order: Vec<CategoryId>,
    pub services: BTreeMap<ServiceId, MedicalService>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub combined_limits: BTreeMap<CombinedLimitId, CombinedLimit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub combined_limits_order: Vec<CombinedLimitId>,
    pub coverage_level_costs_per_plan: BTreeMap<PlanId, PremiumTable>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub health_statuses: BTreeMap<HealthStatusId, HealthStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub health_statuses_order: Vec<HealthStatusId>,
}

impl BenefitsCatalog {
    /// Canonical service order: categories in display order, services in
    /// each category's `ordered_contents` order.
    pub fn ordered_service_ids(&self) -> Vec<ServiceId> {
        self.categories_order
            .iter()
            .filter_map(|category_id| self.categories.get(category_id))
            .flat_map(|category| category.ordered_contents.iter().cloned())
            .collect()
    }
}
