//! Shared application state handed to every Axum handler.

use std::sync::Arc;

use dashmap::DashMap;
use sqlx::PgPool;

use crate::orchestrator::Orchestrator;

/// Role assigned to an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student(i64),
    Admin,
}

/// Lock-free session registry mapping an opaque cookie token to a role,
/// mirroring the teacher's `ServiceStatusRegistry`/`ReferenceCache`
/// "clonable handle over a concurrent map" shape.
#[derive(Clone, Default)]
pub struct SessionCache {
    sessions: Arc<DashMap<String, Role>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token: String, role: Role) {
        self.sessions.insert(token, role);
    }

    pub fn get(&self, token: &str) -> Option<Role> {
        self.sessions.get(token).map(|entry| *entry.value())
    }

    pub fn remove(&self, token: &str) {
        self.sessions.remove(token);
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub orchestrator: Arc<Orchestrator>,
    pub session_cache: SessionCache,
    pub session_cookie_name: String,
    pub admin_username: Arc<str>,
    pub admin_password: Arc<str>,
}

impl AppState {
    pub fn new(
        db_pool: PgPool,
        orchestrator: Arc<Orchestrator>,
        session_cookie_name: String,
        admin_username: String,
        admin_password: String,
    ) -> Self {
        Self {
            db_pool,
            orchestrator,
            session_cache: SessionCache::new(),
            session_cookie_name,
            admin_username: admin_username.into(),
            admin_password: admin_password.into(),
        }
    }
}
