//! API route definitions

use axum::{routing::get, Router};

use super::handlers;
use super::AppState;

/// Create all API routes
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/api/health", get(handlers::health_check))

        // Listener status
        .route("/api/status", get(handlers::get_status))
        .route("/api/status/log", get(handlers::get_status_log))

        // Watched wallets
        .route("/api/wallet_alerts", get(handlers::get_wallet_alerts))
        .route("/api/watchlist", get(handlers::get_watchlist))

        // Recorded pair creations
        .route("/api/token_events", get(handlers::get_token_events))

        // Add state to all routes
        .with_state(state)
}
