//! Web API router construction.

use std::time::Duration;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;

use crate::state::AppState;
use crate::web::middleware::request_id::RequestIdLayer;
use crate::web::middleware::security_headers::SecurityHeadersLayer;
use crate::web::{admin, auth, course_reg, courses};

/// Builds the full API router: auth, the student-facing course catalog and
/// enrollment endpoint, and the admin control surface, wrapped in the
/// request-id/security-header/compression/timeout stack applied to every
/// response.
pub fn create_router(app_state: AppState) -> Router {
    let auth_router = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/check", get(auth::check));

    let courses_router = Router::new()
        .route("/courses", get(courses::list))
        .route("/courses/status", get(courses::status));

    let course_reg_router =
        Router::new().route("/course-reg/enrollment", post(course_reg::enroll));

    let admin_router = Router::new()
        .route("/admin/registration", get(admin::registration_status))
        .route(
            "/admin/registration/start",
            post(admin::start_registration),
        )
        .route(
            "/admin/registration/pause",
            post(admin::pause_registration),
        )
        .route("/admin/registration/period", put(admin::set_period))
        .route(
            "/admin/students",
            post(admin::register_students).delete(admin::reset_students),
        )
        .route(
            "/admin/courses",
            post(admin::create_course).delete(admin::reset_courses),
        )
        .route("/admin/courses/bulk", post(admin::register_courses))
        .route("/admin/courses/{course_id}", delete(admin::delete_course))
        .route("/admin/enrollments", delete(admin::reset_enrollments));

    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(auth_router)
                .merge(courses_router)
                .merge(course_reg_router)
                .merge(admin_router),
        )
        .with_state(app_state)
        .layer((
            RequestIdLayer,
            SecurityHeadersLayer,
            CompressionLayer::new(),
            TimeoutLayer::new(Duration::from_secs(30)),
        ))
}
