use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{self, SharedState};

/// Create the main application router with all API endpoints
pub fn create_router(state: SharedState) -> Router {
    // CORS is open to every origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Connectivity smoke test
        .route("/double", post(handlers::double))
        // Budget endpoints
        .route("/api/bilan", post(handlers::compute_bilan))
        .route("/api/themes", get(handlers::list_themes))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
