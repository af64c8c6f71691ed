//! Calculation engines: the medical plan cost engine and the pre-tax
//! savings estimator. Both are pure, synchronous functions of a validated
//! configuration value and per-call inputs.

pub mod fsae;
pub mod money;
pub mod mpce;

/// Fatal configuration failure: the collated, de-duplicated list of every
/// issue the validator found. Never partially recovered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid configuration: {}", .issues.join("; "))]
pub struct ConfigurationError {
    pub issues: Vec<String>,
}

impl ConfigurationError {
    pub(crate) fn from_issues(mut issues: Vec<String>) -> Self {
        issues.sort();
        issues.dedup();
        Self { issues }
    }
}
