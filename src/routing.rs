//! Application router configuration.

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, Error, endpoints,
    ingest::initialize_database,
    report::{get_bar_chart, get_pie_chart, get_statistics, get_transactions},
};

/// Return a router with all the app's routes.
///
/// Cross-origin requests are allowed from any origin so that a browser
/// dashboard served from elsewhere can call the API.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::TRANSACTIONS, get(get_transactions))
        .route(endpoints::STATISTICS, get(get_statistics))
        .route(endpoints::BAR_CHART, get(get_bar_chart))
        .route(endpoints::PIE_CHART, get(get_pie_chart))
        .route(endpoints::INITIALIZE_DATABASE, get(initialize_database))
        .fallback(get_404_not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
