use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use plan_engine::engines::fsae::blueprint::standard_savings_config;
use plan_engine::engines::fsae::SavingsEstimator;
use plan_engine::engines::mpce::blueprint::standard_catalog;
use plan_engine::engines::mpce::{PlanCostEngine, PreparedCatalog};
use plan_engine::error::AppError;
use plan_engine::router::QuoteState;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load and prepare the benefits catalog: from disk when a path is
/// configured, otherwise the built-in standard catalog.
pub(crate) fn load_prepared_catalog(path: Option<&Path>) -> Result<PreparedCatalog, AppError> {
    let catalog = match path {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => standard_catalog(),
    };
    Ok(PreparedCatalog::prepare(catalog)?)
}

pub(crate) fn quote_state(catalog_path: Option<&Path>) -> Result<QuoteState, AppError> {
    let prepared = load_prepared_catalog(catalog_path)?;
    let estimator = SavingsEstimator::new(Arc::new(standard_savings_config()))?;
    Ok(QuoteState {
        engine: Arc::new(PlanCostEngine::new(Arc::new(prepared))),
        estimator: Arc::new(estimator),
    })
}
