//! Read-only course catalog and seat-status endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::domain::errors::{LifecycleError, RegistrationError};
use crate::domain::models::{Course, CourseAvailability, CourseCountInfo};
use crate::state::AppState;
use crate::web::error::ApiError;

#[derive(Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CourseStatusEntry {
    pub course_id: i64,
    pub count: CourseCountInfo,
    pub availability: CourseAvailability,
}

/// A straight dump of the catalog. Caching/ETag behavior is out of scope.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Course>>, ApiError> {
    let courses = sqlx::query_as::<_, Course>(
        "SELECT id, name, instructor, description, schedules, capacity, is_special FROM courses",
    )
    .fetch_all(&state.db_pool)
    .await
    .map_err(|e| crate::web::error::db_error("courses.list", e.into()))?;
    Ok(Json(courses))
}

pub async fn status(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseStatusEntry>>, ApiError> {
    let counts = match state.orchestrator.status().await {
        Ok(counts) => counts,
        Err(RegistrationError::Lifecycle(LifecycleError::NotInPeriod)) => {
            return Ok(Json(vec![]));
        }
        Err(e) => return Err(e.into()),
    };

    let entries = counts
        .into_iter()
        .map(|(course_id, count)| CourseStatusEntry {
            course_id,
            count,
            availability: count.availability(),
        })
        .collect();
    Ok(Json(entries))
}
