use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use database::mongodb::check_health;
use serde_json::json;

use crate::state::AppState;

/// Readiness probe router. `/health` (liveness) comes from `axum_helpers`;
/// this endpoint additionally verifies the MongoDB connection.
pub fn ready_router(state: AppState) -> Router {
    Router::new().route("/ready", get(ready)).with_state(state)
}

async fn ready(State(state): State<AppState>) -> Response {
    if check_health(&state.mongo_client).await {
        (StatusCode::OK, Json(json!({ "status": "ready" }))).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable", "reason": "mongodb unreachable" })),
        )
            .into_response()
    }
}
