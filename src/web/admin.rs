//! Admin API handlers: registration lifecycle control and bulk
//! student/course management. All endpoints require the `AdminUser`
//! extractor.

use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use ts_rs::TS;

use crate::domain::models::{Course, Student};
use crate::state::{AppState, Role};
use crate::web::error::ApiError;

/// Extractor that only succeeds for an authenticated admin session.
pub struct AdminUser;

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let role = jar
            .get(&state.session_cookie_name)
            .and_then(|cookie| state.session_cache.get(cookie.value()));
        match role {
            Some(Role::Admin) => Ok(AdminUser),
            _ => Err(ApiError::unauthorized("admin session required")),
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatusResponse {
    pub enabled: bool,
    pub start_time: String,
    pub end_time: String,
}

#[instrument(skip_all)]
pub async fn registration_status(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Json<RegistrationStatusResponse> {
    let enabled = state.orchestrator.registration_status().await;
    let (start_time, end_time) = state.orchestrator.registration_period().await;
    Json(RegistrationStatusResponse {
        enabled,
        start_time,
        end_time,
    })
}

#[instrument(skip_all)]
pub async fn start_registration(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.start_registration().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all)]
pub async fn pause_registration(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.pause_registration().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SetPeriodRequest {
    pub start_time: String,
    pub end_time: String,
}

#[instrument(skip_all)]
pub async fn set_period(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<SetPeriodRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .orchestrator
        .set_period(req.start_time, req.end_time)
        .await
        .map_err(|e| crate::web::error::db_error("admin.set_period", e))?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all)]
pub async fn register_students(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(students): Json<Vec<Student>>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.register_students(students).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all)]
pub async fn reset_students(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.reset_students().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all)]
pub async fn create_course(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(course): Json<Course>,
) -> Result<Json<Course>, ApiError> {
    let created = state.orchestrator.create_course(course).await?;
    Ok(Json(created))
}

#[instrument(skip_all)]
pub async fn delete_course(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.delete_course(course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all)]
pub async fn register_courses(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(courses): Json<Vec<Course>>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.register_courses(courses).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all)]
pub async fn reset_courses(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.reset_courses().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all)]
pub async fn reset_enrollments(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.reset_enrollments().await?;
    Ok(StatusCode::NO_CONTENT)
}
