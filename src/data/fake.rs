//! In-memory `EnrollmentRepository` used by domain unit tests so the
//! engine and lifecycle can be exercised without a database.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::models::{Course, Enrollment, RegistrationConfig, Student};
use crate::domain::persistence::EnrollmentRepository;

pub struct FakeRepository {
    next_enrollment_id: AtomicI64,
    enrollments: Mutex<Vec<Enrollment>>,
    students: Mutex<Vec<Student>>,
    courses: Mutex<Vec<Course>>,
    config: Mutex<Option<RegistrationConfig>>,
    fail_next_insert: AtomicBool,
    update_enabled_delay_ms: AtomicU64,
}

impl FakeRepository {
    pub fn new() -> Self {
        Self {
            next_enrollment_id: AtomicI64::new(1),
            enrollments: Mutex::new(Vec::new()),
            students: Mutex::new(Vec::new()),
            courses: Mutex::new(Vec::new()),
            config: Mutex::new(None),
            fail_next_insert: AtomicBool::new(false),
            update_enabled_delay_ms: AtomicU64::new(0),
        }
    }

    /// Make the next `insert_enrollment` call fail, to exercise the
    /// durability-failure path.
    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    /// Stall every future `update_enabled` call by `delay`, to exercise
    /// lock contention during a slow `change_enabled_and_act` transition.
    pub fn set_update_enabled_delay(&self, delay: Duration) {
        self.update_enabled_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for FakeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EnrollmentRepository for FakeRepository {
    async fn insert_enrollment(
        &self,
        student_id: i64,
        course_id: i64,
        position: i32,
        is_waitlist: bool,
    ) -> anyhow::Result<Enrollment> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            anyhow::bail!("simulated persistence failure");
        }
        let id = self.next_enrollment_id.fetch_add(1, Ordering::SeqCst);
        let enrollment = Enrollment {
            id,
            student_id,
            course_id,
            position,
            is_waitlist,
            created_at: Utc::now(),
        };
        self.enrollments.lock().unwrap().push(enrollment.clone());
        Ok(enrollment)
    }

    async fn fetch_all_enrollments(&self) -> anyhow::Result<Vec<Enrollment>> {
        Ok(self.enrollments.lock().unwrap().clone())
    }

    async fn fetch_all_students(&self) -> anyhow::Result<Vec<Student>> {
        Ok(self.students.lock().unwrap().clone())
    }

    async fn fetch_all_courses(&self) -> anyhow::Result<Vec<Course>> {
        Ok(self.courses.lock().unwrap().clone())
    }

    async fn insert_students(&self, students: &[Student]) -> anyhow::Result<()> {
        self.students.lock().unwrap().extend_from_slice(students);
        Ok(())
    }

    async fn delete_all_students(&self) -> anyhow::Result<()> {
        self.students.lock().unwrap().clear();
        Ok(())
    }

    async fn create_course(&self, course: &Course) -> anyhow::Result<Course> {
        self.courses.lock().unwrap().push(course.clone());
        Ok(course.clone())
    }

    async fn delete_course(&self, course_id: i64) -> anyhow::Result<()> {
        let mut courses = self.courses.lock().unwrap();
        let before = courses.len();
        courses.retain(|c| c.id != course_id);
        if courses.len() == before {
            anyhow::bail!("course not found");
        }
        Ok(())
    }

    async fn insert_courses(&self, courses: &[Course]) -> anyhow::Result<()> {
        self.courses.lock().unwrap().extend_from_slice(courses);
        Ok(())
    }

    async fn delete_all_courses(&self) -> anyhow::Result<()> {
        self.courses.lock().unwrap().clear();
        Ok(())
    }

    async fn delete_all_enrollments(&self) -> anyhow::Result<()> {
        self.enrollments.lock().unwrap().clear();
        Ok(())
    }

    async fn get_config(&self) -> anyhow::Result<Option<RegistrationConfig>> {
        Ok(self.config.lock().unwrap().clone())
    }

    async fn create_config(&self) -> anyhow::Result<RegistrationConfig> {
        let config = RegistrationConfig {
            id: crate::domain::models::REGISTRATION_CONFIG_ID,
            enabled: false,
            start_time: String::new(),
            end_time: String::new(),
        };
        *self.config.lock().unwrap() = Some(config.clone());
        Ok(config)
    }

    async fn update_enabled(&self, enabled: bool) -> anyhow::Result<()> {
        let delay_ms = self.update_enabled_delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        let mut guard = self.config.lock().unwrap();
        let config = guard.as_mut().ok_or_else(|| anyhow::anyhow!("config not created"))?;
        config.enabled = enabled;
        Ok(())
    }

    async fn update_period(&self, start_time: &str, end_time: &str) -> anyhow::Result<()> {
        let mut guard = self.config.lock().unwrap();
        let config = guard.as_mut().ok_or_else(|| anyhow::anyhow!("config not created"))?;
        config.start_time = start_time.to_owned();
        config.end_time = end_time.to_owned();
        Ok(())
    }
}
