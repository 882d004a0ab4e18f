//! HTTP-facing error type. Every handler returns `Result<T, ApiError>`;
//! this maps domain errors onto the status codes and machine-readable
//! codes the API surface commits to.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::domain::errors::{EnrollmentError, LifecycleError, RegistrationError};
use crate::domain::schedule::ScheduleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    BadRequest,
    Unauthorized,
    NotFound,
    Conflict,
    Full,
    LifecycleBusy,
    InternalError,
}

#[derive(Debug)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    code: ApiErrorCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorCode::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ApiErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiErrorCode::Conflict, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorCode::InternalError,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            code: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Wrap a database/`anyhow` error as a 500, tagging it with `label` in
/// the server-side log -- the client only ever sees a generic message.
pub fn db_error(label: &str, err: anyhow::Error) -> ApiError {
    tracing::error!(error = ?err, label, "database operation failed");
    ApiError::internal_error("internal error")
}

impl From<EnrollmentError> for ApiError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::CourseNotFound(_) | EnrollmentError::StudentNotFound(_) => {
                ApiError::new(StatusCode::NOT_FOUND, ApiErrorCode::NotFound, err.to_string())
            }
            EnrollmentError::TimeConflict | EnrollmentError::AlreadyEnrolled => {
                ApiError::new(StatusCode::CONFLICT, ApiErrorCode::Conflict, err.to_string())
            }
            EnrollmentError::CourseFull => {
                ApiError::new(StatusCode::CONFLICT, ApiErrorCode::Full, err.to_string())
            }
            EnrollmentError::Persistence(e) => db_error("enroll", e),
        }
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NotInPeriod => ApiError::new(
                StatusCode::FORBIDDEN,
                ApiErrorCode::BadRequest,
                err.to_string(),
            ),
            LifecycleError::AlreadySet(_) | LifecycleError::AlreadyRunning => {
                ApiError::conflict(err.to_string())
            }
            LifecycleError::WrongState => ApiError::new(
                StatusCode::FORBIDDEN,
                ApiErrorCode::BadRequest,
                err.to_string(),
            ),
            LifecycleError::LifecycleBusy => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                ApiErrorCode::LifecycleBusy,
                err.to_string(),
            ),
            LifecycleError::InvalidInput(_) => ApiError::bad_request(err.to_string()),
            LifecycleError::Persistence(e) => db_error("lifecycle", e),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Lifecycle(e) => e.into(),
            RegistrationError::Enrollment(e) => e.into(),
        }
    }
}

impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

/// Extension for mapping `Option<T>` to a 404 `ApiError`.
pub trait OptionNotFoundExt<T> {
    fn or_not_found(self, message: impl Into<String>) -> Result<T, ApiError>;
}

impl<T> OptionNotFoundExt<T> for Option<T> {
    fn or_not_found(self, message: impl Into<String>) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(message))
    }
}
