//! Application router configuration.

use axum::{Router, routing::get};

use crate::{
    api::{get_chart_data, get_kpis, get_options, get_report, get_transactions},
    app_state::AppState,
    endpoints,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::TRANSACTIONS, get(get_transactions))
        .route(endpoints::KPIS, get(get_kpis))
        .route(endpoints::REPORT, get(get_report))
        .route(endpoints::CHART_DATA, get(get_chart_data))
        .route(endpoints::OPTIONS, get(get_options))
        .with_state(state)
}
