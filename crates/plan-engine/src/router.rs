use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use crate::engines::fsae::{SavingsEstimateRequest, SavingsEstimator};
use crate::engines::mpce::domain::RegionId;
use crate::engines::mpce::{CalculationRequest, PlanCostEngine};
use crate::error::AppError;

/// Shared handler state: both engines over their prepared configurations.
#[derive(Clone)]
pub struct QuoteState {
    pub engine: Arc<PlanCostEngine>,
    pub estimator: Arc<SavingsEstimator>,
}

/// Router builder exposing the estimate endpoints.
pub fn quote_router(state: QuoteState) -> Router {
    Router::new()
        .route("/api/v1/plans/estimate", post(plans_estimate_handler))
        .route("/api/v1/accounts/estimate", post(accounts_estimate_handler))
        .route("/api/v1/regions/:region_id/plans", get(region_plans_handler))
        .with_state(state)
}

pub(crate) async fn plans_estimate_handler(
    State(state): State<QuoteState>,
    axum::Json(request): axum::Json<CalculationRequest>,
) -> Response {
    match state.engine.calculate(&request) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn accounts_estimate_handler(
    State(state): State<QuoteState>,
    axum::Json(request): axum::Json<SavingsEstimateRequest>,
) -> Response {
    match state.estimator.calculate(&request) {
        Ok(estimate) => (StatusCode::OK, axum::Json(estimate)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn region_plans_handler(
    State(state): State<QuoteState>,
    Path(region_id): Path<String>,
) -> Response {
    let catalog = state.engine.catalog().catalog();
    let region_id = RegionId::new(region_id);
    match catalog.regions.get(&region_id) {
        Some(region) => {
            let plans: Vec<_> = region
                .plans
                .iter()
                .map(|plan_id| {
                    json!({
                        "planId": plan_id,
                        "description": catalog.plans[plan_id].description.resolve(),
                    })
                })
                .collect();
            (
                StatusCode::OK,
                axum::Json(json!({
                    "regionId": region_id,
                    "description": region.description.resolve(),
                    "plans": plans,
                })),
            )
                .into_response()
        }
        None => {
            let payload = json!({ "error": format!("unknown region '{region_id}'") });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}
