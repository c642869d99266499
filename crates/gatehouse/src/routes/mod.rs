//! HTTP route handlers for Gatehouse.

use std::time::Duration;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use gatehouse_common::constants::SERVICE_UNAVAILABLE_ERROR;
use gatehouse_common::{ActionOutcome, GateError};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::state::AppState;

mod course;
mod health;
mod maintenance;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let maintenance_path = state.config.maintenance_path.clone();
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        // Health & Status
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))

        // Root redirect
        .route("/", get(maintenance::redirect_root))
        .route(&maintenance_path, get(maintenance::maintenance_notice))

        // Courses
        .route("/courses", get(course::list_courses))
        .route(
            "/course/{course_id}",
            get(course::get_course).post(course::submit_action),
        )

        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))

        // Add shared state
        .with_state(state)
}

/// Error rendered as `{"error": "..."}` with the matching status code
#[derive(Debug)]
pub struct ApiError(GateError);

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match &self.0 {
            GateError::ServiceUnavailable(_) => SERVICE_UNAVAILABLE_ERROR.to_string(),
            GateError::NotFound(_) | GateError::InvalidInput(_) => self.0.to_string(),
            other => {
                tracing::error!(error = %other, "Request failed");
                "Internal server error".to_string()
            }
        };

        (status, Json(ActionOutcome::denied(message))).into_response()
    }
}
