//! Health check endpoints

use axum::{extract::State, response::Json, routing::get, Router};
use bizdash_services::ResearchStatus;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    research: ResearchStatus,
}

/// Health check handler
///
/// Missing provider keys do not make the server unhealthy; simulated research
/// and content generation still work without them.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        research: state.research_service.status(),
    })
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}
