//! Core entity types shared across the domain, data, and web layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS, sqlx::FromRow)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub birth_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, sqlx::FromRow)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub instructor: String,
    pub description: String,
    pub schedules: String,
    pub capacity: i32,
    pub is_special: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, sqlx::FromRow)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub position: i32,
    pub is_waitlist: bool,
    pub created_at: DateTime<Utc>,
}

/// Singleton configuration row (always id = 1).
#[derive(Debug, Clone, Serialize, Deserialize, TS, sqlx::FromRow)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationConfig {
    pub id: i32,
    pub enabled: bool,
    pub start_time: String,
    pub end_time: String,
}

pub const REGISTRATION_CONFIG_ID: i32 = 1;

/// Per-course seat accounting, returned by status queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CourseCountInfo {
    pub capacity: i32,
    pub enrolled_count: i32,
    pub waiting_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CourseAvailability {
    Available,
    Waitlist,
    Full,
}

impl CourseCountInfo {
    pub fn availability(&self) -> CourseAvailability {
        if self.enrolled_count < self.capacity {
            CourseAvailability::Available
        } else if self.waiting_count < self.capacity {
            CourseAvailability::Waitlist
        } else {
            CourseAvailability::Full
        }
    }
}
