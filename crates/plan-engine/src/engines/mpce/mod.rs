//! Medical Plan Cost Engine: estimates end-of-year out-of-pocket costs for
//! a household under every plan offered in a region, applying per-service
//! coverage rules against shared deductible, out-of-pocket, and combined
//! reimbursement budgets.

pub mod blueprint;
pub mod domain;
pub mod household;
pub mod validation;

mod amounts;
mod budgets;
mod engine;
mod markup;
mod plan;
mod rules;

#[cfg(test)]
mod tests;

pub use engine::{CalculationError, CalculationOutcome, CalculationRequest, PlanCostEngine};
pub use markup::{ChargeRule, CoverageRule, DeductibleTiming, PlanTables, PreparedCatalog};
pub use plan::{PlanInputs, PlanResult};
