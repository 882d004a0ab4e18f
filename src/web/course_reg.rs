//! The enrollment endpoint: the one hot path the whole engine exists for.

use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::state::{AppState, Role};
use crate::web::error::ApiError;

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub course_id: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EnrollResponse {
    pub position: i32,
}

pub async fn enroll(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<EnrollRequest>,
) -> Result<Json<EnrollResponse>, ApiError> {
    let student_id = match jar
        .get(&state.session_cookie_name)
        .and_then(|cookie| state.session_cache.get(cookie.value()))
    {
        Some(Role::Student(id)) => id,
        _ => return Err(ApiError::unauthorized("must be logged in as a student")),
    };

    let outcome = state.orchestrator.enroll(student_id, req.course_id).await?;

    let crate::domain::engine::EnrollmentOutcome::Enrolled { position } = outcome;
    Ok(Json(EnrollResponse { position }))
}
