//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Largest accepted upload body.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for the dashboard running on another port
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Usage sessions
        .route(
            "/usage",
            get(handlers::list_usage).post(handlers::create_usage),
        )
        .route("/usage/import", post(handlers::import_usage))
        .route(
            "/usage/{id}",
            get(handlers::get_usage)
                .put(handlers::update_usage)
                .delete(handlers::delete_usage),
        )
        // Demand analysis
        .route("/demand/summary", get(handlers::get_demand_summary))
        .route("/demand/analysis", get(handlers::get_demand_analysis))
        .route("/demand/analyze", post(handlers::analyze_demand))
        // PC registry
        .route("/pcs", get(handlers::list_pcs).post(handlers::create_pc))
        .route("/pcs/seed", post(handlers::seed_pcs))
        .route("/pcs/summary", get(handlers::get_pc_summary))
        .route(
            "/pcs/{id}",
            get(handlers::get_pc).delete(handlers::delete_pc),
        )
        .route("/pcs/{id}/status", put(handlers::update_pc_status))
        // Live sessions
        .route(
            "/sessions",
            get(handlers::list_sessions).post(handlers::start_session),
        )
        .route("/sessions/{id}", get(handlers::get_session))
        .route("/sessions/{id}/end", post(handlers::end_session))
        // Reservations
        .route(
            "/reservations",
            get(handlers::list_reservations).post(handlers::create_reservation),
        )
        .route(
            "/reservations/{id}",
            get(handlers::get_reservation).delete(handlers::delete_reservation),
        )
        .route(
            "/reservations/{id}/status",
            put(handlers::update_reservation_status),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::FullRepository;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
        let state = AppState::new(repo);
        let _router = create_router(state);
    }
}
