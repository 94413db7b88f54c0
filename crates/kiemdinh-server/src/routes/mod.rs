pub mod evaluate;
pub mod health;
pub mod rules;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /evaluate                 POST   compact per-contaminant statuses
/// /evaluate/detailed        POST   full evaluation and verdict
/// /evaluate/samples         POST   replicate sampling plan
/// /rules                    GET    rule table summary
/// /rules/crops/{crop}       GET    limits applicable to one crop type
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/evaluate", post(evaluate::evaluate))
        .route("/evaluate/detailed", post(evaluate::evaluate_detailed))
        .route("/evaluate/samples", post(evaluate::evaluate_samples))
        .route("/rules", get(rules::summary))
        .route("/rules/crops/{crop}", get(rules::crop_rules))
}
