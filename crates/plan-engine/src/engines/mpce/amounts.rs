//! Polymorphic amount lookups. Amount maps are keyed by coverage level,
//! optionally nested under a region or an employment status; premium tables
//! are keyed by coverage level, optionally nested under a region. Lookup
//! always prefers the region branch, then the status branch, then the
//! direct entry.

use super::domain::{
    AmountMap, AmountMapNode, CoverageLevelId, PremiumNode, PremiumTable, RegionId, StatusId,
};

pub(crate) fn resolve_amount(
    map: &AmountMap,
    region_id: &RegionId,
    status_id: &StatusId,
    coverage_level_id: &CoverageLevelId,
) -> Option<f64> {
    if let Some(AmountMapNode::ByCoverageLevel(by_level)) = map.0.get(region_id.as_str()) {
        return by_level.get(coverage_level_id).copied();
    }
    if let Some(AmountMapNode::ByCoverageLevel(by_level)) = map.0.get(status_id.as_str()) {
        return by_level.get(coverage_level_id).copied();
    }
    match map.0.get(coverage_level_id.as_str()) {
        Some(AmountMapNode::Amount(amount)) => Some(*amount),
        _ => None,
    }
}

pub(crate) fn resolve_premium(
    table: &PremiumTable,
    region_id: &RegionId,
    status_id: &StatusId,
    coverage_level_id: &CoverageLevelId,
) -> Option<f64> {
    if let Some(PremiumNode::ByCoverageLevel(by_level)) = table.0.get(region_id.as_str()) {
        return by_level
            .get(coverage_level_id)
            .and_then(|by_status| by_status.get(status_id))
            .copied()
            .flatten();
    }
    match table.0.get(coverage_level_id.as_str()) {
        Some(PremiumNode::ByStatus(by_status)) => by_status.get(status_id).copied().flatten(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn level(id: &str) -> CoverageLevelId {
        CoverageLevelId::from(id)
    }

    #[test]
    fn direct_coverage_level_lookup() {
        let mut map = AmountMap::default();
        map.0
            .insert("employeeOnly".to_string(), AmountMapNode::Amount(450.0));

        let resolved = resolve_amount(
            &map,
            &RegionId::from("CA"),
            &StatusId::from("fullTime"),
            &level("employeeOnly"),
        );
        assert_eq!(resolved, Some(450.0));
    }

    #[test]
    fn region_branch_wins_over_direct_entry() {
        let mut by_level = BTreeMap::new();
        by_level.insert(level("employeeOnly"), 300.0);

        let mut map = AmountMap::default();
        map.0
            .insert("CA".to_string(), AmountMapNode::ByCoverageLevel(by_level));
        map.0
            .insert("employeeOnly".to_string(), AmountMapNode::Amount(450.0));

        let resolved = resolve_amount(
            &map,
            &RegionId::from("CA"),
            &StatusId::from("fullTime"),
            &level("employeeOnly"),
        );
        assert_eq!(resolved, Some(300.0));
    }

    #[test]
    fn status_branch_consulted_after_region() {
        let mut by_level = BTreeMap::new();
        by_level.insert(level("employeeOnly"), 600.0);

        let mut map = AmountMap::default();
        map.0.insert(
            "fullTime".to_string(),
            AmountMapNode::ByCoverageLevel(by_level),
        );

        let resolved = resolve_amount(
            &map,
            &RegionId::from("AZ"),
            &StatusId::from("fullTime"),
            &level("employeeOnly"),
        );
        assert_eq!(resolved, Some(600.0));
    }

    #[test]
    fn premium_null_means_not_offered() {
        let mut by_status = BTreeMap::new();
        by_status.insert(StatusId::from("fullTime"), None);

        let mut table = PremiumTable::default();
        table
            .0
            .insert("employeeOnly".to_string(), PremiumNode::ByStatus(by_status));

        let resolved = resolve_premium(
            &table,
            &RegionId::from("CA"),
            &StatusId::from("fullTime"),
            &level("employeeOnly"),
        );
        assert_eq!(resolved, None);
    }

    #[test]
    fn premium_region_shape_resolves() {
        let mut by_status = BTreeMap::new();
        by_status.insert(StatusId::from("fullTime"), Some(936.0));
        let mut by_level = BTreeMap::new();
        by_level.insert(level("employeeOnly"), by_status);

        let mut table = PremiumTable::default();
        table
            .0
            .insert("CA".to_string(), PremiumNode::ByCoverageLevel(by_level));

        let resolved = resolve_premium(
            &table,
            &RegionId::from("CA"),
            &StatusId::from("fullTime"),
            &level("employeeOnly"),
        );
        assert_eq!(resolved, Some(936.0));
    }
}
