//! Course listing and the CAPTCHA-protected course action.

use std::collections::HashMap;

use axum::{
    extract::{Form, Path, State, rejection::FormRejection},
    Json,
};
use gatehouse_common::{ActionOutcome, Course, GateError};

use super::ApiError;
use crate::state::AppState;
use crate::turnstile::token_fingerprint;

/// List all courses
pub async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, ApiError> {
    let courses = state.courses.list_courses().await?;
    Ok(Json(courses))
}

/// Fetch a single course
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Course>, ApiError> {
    state
        .courses
        .find_course(&course_id)
        .await?
        .map(Json)
        .ok_or_else(|| GateError::NotFound(format!("course {}", course_id)).into())
}

/// Form action guarding course access.
///
/// Returns `{"success": true}` when the Turnstile token verifies and
/// `{"error": "..."}` when it does not. A verification service outage is a
/// 503, never reported as a bad CAPTCHA.
pub async fn submit_action(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Json<ActionOutcome>, ApiError> {
    let Form(fields) = form.map_err(|rejection| {
        tracing::debug!(course_id = %course_id, error = %rejection, "Unreadable course action form");
        GateError::InvalidInput(rejection.body_text())
    })?;
    let token = fields.get(&state.config.turnstile.form_field).map(String::as_str);

    tracing::debug!(
        course_id = %course_id,
        token = ?token.map(token_fingerprint),
        "Course action submitted"
    );

    let verdict = state.validator.validate(token).await.map_err(|e| {
        tracing::warn!(course_id = %course_id, error = %e, "Turnstile verification unavailable");
        GateError::from(e)
    })?;

    let outcome = verdict.into_outcome();
    if outcome.is_granted() {
        tracing::info!(course_id = %course_id, "Course access granted");
    }

    Ok(Json(outcome))
}
