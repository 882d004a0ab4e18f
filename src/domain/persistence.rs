//! Persistence bridge: the narrow interface the engine and orchestrator
//! use to reach durable storage, independent of the concrete database.

use async_trait::async_trait;

use super::models::{Course, Enrollment, RegistrationConfig, Student};

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn insert_enrollment(
        &self,
        student_id: i64,
        course_id: i64,
        position: i32,
        is_waitlist: bool,
    ) -> anyhow::Result<Enrollment>;

    async fn fetch_all_enrollments(&self) -> anyhow::Result<Vec<Enrollment>>;
    async fn fetch_all_students(&self) -> anyhow::Result<Vec<Student>>;
    async fn fetch_all_courses(&self) -> anyhow::Result<Vec<Course>>;

    async fn insert_students(&self, students: &[Student]) -> anyhow::Result<()>;
    async fn delete_all_students(&self) -> anyhow::Result<()>;

    async fn create_course(&self, course: &Course) -> anyhow::Result<Course>;
    async fn delete_course(&self, course_id: i64) -> anyhow::Result<()>;
    async fn insert_courses(&self, courses: &[Course]) -> anyhow::Result<()>;
    async fn delete_all_courses(&self) -> anyhow::Result<()>;

    async fn delete_all_enrollments(&self) -> anyhow::Result<()>;

    async fn get_config(&self) -> anyhow::Result<Option<RegistrationConfig>>;
    async fn create_config(&self) -> anyhow::Result<RegistrationConfig>;
    async fn update_enabled(&self, enabled: bool) -> anyhow::Result<()>;
    async fn update_period(&self, start_time: &str, end_time: &str) -> anyhow::Result<()>;
}
