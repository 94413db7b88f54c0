use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Name of the loaded rule table.
    pub ruleset: String,
    pub ruleset_version: String,
}

/// GET /health -- returns service status and the loaded rule table version.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        ruleset: state.table.name().to_string(),
        ruleset_version: state.table.version().to_string(),
    })
}

/// Mount health check routes (root level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
