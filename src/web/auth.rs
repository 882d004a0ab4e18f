//! Minimal session auth. Students log in with their phone number as
//! `username` and their birth date as `password`, matching the original
//! system's student credential scheme; the admin account is a single
//! config-provided username/password pair. Session/CORS hardening is out
//! of scope -- this exists only to gate the enrollment endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::state::{AppState, Role};
use crate::web::error::ApiError;

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    /// Phone number for students, the configured admin username for the
    /// admin account.
    pub username: String,
    /// Birth date for students, the configured admin password for the
    /// admin account.
    pub password: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub role: &'static str,
    pub student_id: Option<i64>,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    if req.username == *state.admin_username && req.password == *state.admin_password {
        let token = generate_token();
        state.session_cache.insert(token.clone(), Role::Admin);
        let cookie = Cookie::new(state.session_cookie_name.clone(), token);
        return Ok((
            jar.add(cookie),
            Json(LoginResponse {
                role: "admin",
                student_id: None,
            }),
        ));
    }

    let row: Option<(i64, String)> =
        sqlx::query_as("SELECT id, birth_date FROM students WHERE phone = $1")
            .bind(&req.username)
            .fetch_optional(&state.db_pool)
            .await
            .map_err(|e| crate::web::error::db_error("auth.login", e.into()))?;

    let Some((student_id, birth_date)) = row else {
        return Err(ApiError::unauthorized("invalid credentials"));
    };
    if birth_date != req.password {
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let token = generate_token();
    state
        .session_cache
        .insert(token.clone(), Role::Student(student_id));
    let cookie = Cookie::new(state.session_cookie_name.clone(), token);
    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            role: "student",
            student_id: Some(student_id),
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    if let Some(cookie) = jar.get(&state.session_cookie_name) {
        state.session_cache.remove(cookie.value());
    }
    let jar = jar.remove(Cookie::from(state.session_cookie_name.clone()));
    Ok((jar, StatusCode::NO_CONTENT))
}

#[derive(Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AuthCheckResponse {
    pub authenticated: bool,
    pub role: Option<&'static str>,
}

pub async fn check(State(state): State<AppState>, jar: CookieJar) -> Json<AuthCheckResponse> {
    let role = jar
        .get(&state.session_cookie_name)
        .and_then(|cookie| state.session_cache.get(cookie.value()));

    match role {
        Some(Role::Admin) => Json(AuthCheckResponse {
            authenticated: true,
            role: Some("admin"),
        }),
        Some(Role::Student(_)) => Json(AuthCheckResponse {
            authenticated: true,
            role: Some("student"),
        }),
        None => Json(AuthCheckResponse {
            authenticated: false,
            role: None,
        }),
    }
}

fn generate_token() -> String {
    nanoid::nanoid!(32)
}
