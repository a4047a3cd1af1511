//! HTTP router setup.

use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/collections", get(handlers::collections))
        .route("/nfts", get(handlers::nfts))
        .route("/nfts/cached", get(handlers::nfts_cached))
        .route("/owners/{owner}/nfts", get(handlers::owner_nfts))
        .route("/checkout", post(handlers::checkout))
        .route("/catalog", get(handlers::catalog))
        .route("/users", get(handlers::users))
        .route("/users/{address}/value", get(handlers::user_value))
        .route("/map", get(handlers::map))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
