//! Flexible spending / health savings estimator: sizes a pre-tax account
//! contribution for a target annual cost and computes the income-tax and
//! FICA payroll savings from a bracketed tax schedule.

pub mod blueprint;
pub mod domain;
pub mod validation;

mod engine;


pub use engine::{
    ContributionSuggestion, Costs, EstimateError, SavingsEstimate, SavingsEstimateRequest,
    SavingsEstimator,
};
