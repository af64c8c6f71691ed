//! Medical plan cost estimation and pre-tax savings calculation.
//!
//! The two engines are pure, synchronous functions of a validated
//! configuration value: [`engines::mpce`] estimates end-of-year
//! out-of-pocket costs for a household under every plan in a region, and
//! [`engines::fsae`] sizes a flexible spending / health savings
//! contribution and its tax savings. [`router`] exposes both over HTTP.

pub mod config;
pub mod engines;
pub mod error;
pub mod router;
pub mod telemetry;

pub use engines::fsae::{SavingsEstimate, SavingsEstimateRequest, SavingsEstimator};
pub use engines::mpce::{
    CalculationOutcome, CalculationRequest, PlanCostEngine, PlanResult, PreparedCatalog,
};
pub use engines::ConfigurationError;
