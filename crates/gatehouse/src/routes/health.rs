//! Health check endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Basic health check (is the server running?)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct ReadyResponse {
    status: &'static str,
    course_store: bool,
}

/// Readiness check (are all dependencies healthy?)
///
/// The siteverify endpoint is not probed: it is a third party and a
/// failed probe would only burn a request.
pub async fn ready_check(
    State(state): State<AppState>,
) -> Result<Json<ReadyResponse>, StatusCode> {
    if state.courses.ping().await {
        Ok(Json(ReadyResponse {
            status: "ready",
            course_store: true,
        }))
    } else {
        tracing::warn!("Readiness check failed: course store unreachable");
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
