//! Root redirect and maintenance notice.

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::state::AppState;

/// `GET /` always lands on the maintenance page
pub async fn redirect_root(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [(header::LOCATION, state.config.maintenance_path.clone())],
    )
}

#[derive(Serialize)]
pub struct MaintenanceNotice {
    status: &'static str,
    message: &'static str,
}

pub async fn maintenance_notice() -> Json<MaintenanceNotice> {
    Json(MaintenanceNotice {
        status: "maintenance",
        message: "The course portal is under maintenance. Course pages remain available.",
    })
}
