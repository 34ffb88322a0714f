pub mod health;
pub mod search;

use axum::{
    routing::{get, post},
    Router,
};

use crate::calendar::handlers;
use crate::state::AppState;
use crate::stats;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Calendar API
        .route("/api/v1/calendar", get(handlers::handle_calendar))
        .route("/api/v1/calendar/events", get(handlers::handle_events))
        .route(
            "/api/v1/layout/preview",
            post(handlers::handle_layout_preview),
        )
        // Search API
        .route("/api/v1/search", get(search::handle_search))
        // Statistics API
        .route("/api/v1/stats/scores", get(stats::handle_score_stats))
        .with_state(state)
}
