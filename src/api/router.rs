use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, blood_group_summary, create_donor, eligibility_window, export_donors_csv,
    get_donor_by_id, list_donors, update_donor,
};

/// Creates the API router with all donor registry endpoints
///
/// Command endpoints (Write operations):
/// - POST /donors - Register a donor
/// - PUT /donors/:id - Replace a donor's fields
///
/// Query endpoints (Read operations):
/// - GET /donors - List donors with filters
/// - GET /donors/:id - Get donor details
/// - GET /donors/summary - Per-blood-group counts
/// - GET /donors/export.csv - CSV report
/// - GET /eligibility/window - Accepted last-donation range
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/donors", post(create_donor).get(list_donors))
        .route("/donors/summary", get(blood_group_summary))
        .route("/donors/export.csv", get(export_donors_csv))
        .route("/donors/:id", get(get_donor_by_id).put(update_donor))
        .route("/eligibility/window", get(eligibility_window))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
