//! Wires the registration lifecycle, the enrollment engine, and the
//! persistence bridge together for the admin-facing start/pause/reset
//! operations. Mirrors the original `AdminService`.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::engine::{EnrollmentEngine, EnrollmentOutcome};
use crate::domain::errors::{LifecycleError, RegistrationError};
use crate::domain::lifecycle::RegistrationLifecycle;
use crate::domain::models::{Course, CourseCountInfo, RegistrationConfig, Student};
use crate::domain::persistence::EnrollmentRepository;

pub struct Orchestrator {
    lifecycle: RegistrationLifecycle,
    engine: RwLock<Option<EnrollmentEngine>>,
    repo: Arc<dyn EnrollmentRepository>,
}

impl Orchestrator {
    /// Construct the orchestrator from the persisted config, but do not
    /// start the engine yet -- callers should call `resume_if_enabled`
    /// once every other component is wired, matching the original's
    /// restart semantics.
    pub fn new(config: RegistrationConfig, repo: Arc<dyn EnrollmentRepository>) -> Self {
        Self {
            lifecycle: RegistrationLifecycle::new(false, config.start_time, config.end_time),
            engine: RwLock::new(None),
            repo,
        }
    }

    /// If the persisted config says registration was enabled, start it
    /// back up now that the orchestrator is fully wired.
    pub async fn resume_if_enabled(&self, was_enabled: bool) -> anyhow::Result<()> {
        if was_enabled {
            self.start_registration().await.map_err(|e| anyhow::anyhow!(e))?;
        }
        Ok(())
    }

    pub async fn current_engine(&self) -> Option<EnrollmentEngine> {
        self.engine.read().await.clone()
    }

    pub async fn registration_status(&self) -> bool {
        self.lifecycle.is_enabled().await
    }

    pub async fn registration_period(&self) -> (String, String) {
        self.lifecycle.period().await
    }

    pub async fn set_period(&self, start_time: String, end_time: String) -> anyhow::Result<()> {
        self.repo.update_period(&start_time, &end_time).await?;
        self.lifecycle.set_period(start_time, end_time).await;
        Ok(())
    }

    /// Gate a single enrollment attempt behind the lifecycle's
    /// non-blocking read acquisition, then hand it to the engine. Failing
    /// fast here (rather than queuing behind a start/pause transition) is
    /// the correctness property the whole lifecycle design exists for.
    pub async fn enroll(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<EnrollmentOutcome, RegistrationError> {
        self.lifecycle
            .run_if_enabled(|| async move {
                let engine: EnrollmentEngine = self
                    .current_engine()
                    .await
                    .ok_or(RegistrationError::Lifecycle(LifecycleError::NotInPeriod))?;
                Ok(engine.enroll(student_id, course_id).await?)
            })
            .await
    }

    /// Gate a seat-status read behind the same non-blocking lifecycle
    /// acquisition `enroll` uses, so a `GET /courses/status` call during a
    /// slow start/pause transition fails fast with `LifecycleBusy` instead
    /// of blocking on the transition.
    pub async fn status(
        &self,
    ) -> Result<std::collections::HashMap<i64, CourseCountInfo>, RegistrationError> {
        self.lifecycle
            .run_if_enabled(|| async move {
                let engine: EnrollmentEngine = self
                    .current_engine()
                    .await
                    .ok_or(RegistrationError::Lifecycle(LifecycleError::NotInPeriod))?;
                engine
                    .status()
                    .await
                    .map_err(|e| RegistrationError::Lifecycle(LifecycleError::Persistence(e)))
            })
            .await
    }

    /// Warm the engine from the latest durable snapshot, then persist
    /// `enabled = true`. Any failure here (loading data, starting the
    /// worker, or the persistence write) leaves the lifecycle untouched.
    pub async fn start_registration(&self) -> Result<(), LifecycleError> {
        let repo = self.repo.clone();
        let engine_slot = &self.engine;
        self.lifecycle
            .change_enabled_and_act(true, || async move {
                let students = repo.fetch_all_students().await?;
                let courses = repo.fetch_all_courses().await?;
                let enrollments = repo.fetch_all_enrollments().await?;
                let engine = EnrollmentEngine::start(students, courses, enrollments, repo.clone());
                *engine_slot.write().await = Some(engine);
                repo.update_enabled(true).await?;
                Ok(())
            })
            .await
    }

    /// Stop accepting enrollments and persist `enabled = false`. The
    /// worker task is dropped once its channel sender is cleared, which
    /// ends the loop the next time `recv()` is polled.
    pub async fn pause_registration(&self) -> Result<(), LifecycleError> {
        let repo = self.repo.clone();
        let engine_slot = &self.engine;
        self.lifecycle
            .change_enabled_and_act(false, || async move {
                *engine_slot.write().await = None;
                repo.update_enabled(false).await?;
                Ok(())
            })
            .await
    }

    pub async fn register_students(&self, students: Vec<Student>) -> Result<(), LifecycleError> {
        let repo = self.repo.clone();
        self.lifecycle
            .run_if_disabled(|| async move { Ok(repo.insert_students(&students).await?) })
            .await
    }

    pub async fn reset_students(&self) -> Result<(), LifecycleError> {
        let repo = self.repo.clone();
        self.lifecycle
            .run_if_disabled(|| async move { Ok(repo.delete_all_students().await?) })
            .await
    }

    pub async fn create_course(&self, course: Course) -> Result<Course, LifecycleError> {
        validate_capacity(course.capacity)?;
        let repo = self.repo.clone();
        self.lifecycle
            .run_if_disabled(|| async move { Ok(repo.create_course(&course).await?) })
            .await
    }

    pub async fn delete_course(&self, course_id: i64) -> Result<(), LifecycleError> {
        let repo = self.repo.clone();
        self.lifecycle
            .run_if_disabled(|| async move { Ok(repo.delete_course(course_id).await?) })
            .await
    }

    pub async fn register_courses(&self, courses: Vec<Course>) -> Result<(), LifecycleError> {
        for course in &courses {
            validate_capacity(course.capacity)?;
        }
        let repo = self.repo.clone();
        self.lifecycle
            .run_if_disabled(|| async move { Ok(repo.insert_courses(&courses).await?) })
            .await
    }

    pub async fn reset_courses(&self) -> Result<(), LifecycleError> {
        let repo = self.repo.clone();
        self.lifecycle
            .run_if_disabled(|| async move { Ok(repo.delete_all_courses().await?) })
            .await
    }

    pub async fn reset_enrollments(&self) -> Result<(), LifecycleError> {
        let repo = self.repo.clone();
        self.lifecycle
            .run_if_disabled(|| async move { Ok(repo.delete_all_enrollments().await?) })
            .await
    }
}

fn validate_capacity(capacity: i32) -> Result<(), LifecycleError> {
    if capacity < 0 {
        return Err(LifecycleError::InvalidInput(format!(
            "capacity must be >= 0, got {capacity}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fake::FakeRepository;
    use crate::domain::models::{Course, Student, REGISTRATION_CONFIG_ID};

    fn config(enabled: bool) -> RegistrationConfig {
        RegistrationConfig {
            id: REGISTRATION_CONFIG_ID,
            enabled,
            start_time: "2026-01-01T00:00:00Z".into(),
            end_time: "2026-01-02T00:00:00Z".into(),
        }
    }

    fn course(id: i64, capacity: i32) -> Course {
        Course {
            id,
            name: format!("course-{id}"),
            instructor: "staff".into(),
            description: String::new(),
            schedules: "mon 09:00~10:00".into(),
            capacity,
            is_special: false,
        }
    }

    fn student(id: i64) -> Student {
        Student {
            id,
            name: format!("student-{id}"),
            phone: format!("010-0000-{id:04}"),
            birth_date: "2000-01-01".into(),
        }
    }

    #[tokio::test]
    async fn enroll_is_rejected_before_registration_starts() {
        let repo: Arc<dyn EnrollmentRepository> = Arc::new(FakeRepository::new());
        repo.insert_students(&[student(1)]).await.unwrap();
        repo.insert_courses(&[course(1, 10)]).await.unwrap();

        let orchestrator = Orchestrator::new(config(false), repo);
        let err = orchestrator.enroll(1, 1).await.unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::Lifecycle(LifecycleError::NotInPeriod)
        ));
    }

    #[tokio::test]
    async fn enroll_succeeds_once_registration_is_started() {
        let repo: Arc<dyn EnrollmentRepository> = Arc::new(FakeRepository::new());
        repo.create_config().await.unwrap();
        repo.insert_students(&[student(1)]).await.unwrap();
        repo.insert_courses(&[course(1, 10)]).await.unwrap();

        let orchestrator = Orchestrator::new(config(false), repo);
        orchestrator.start_registration().await.unwrap();

        let outcome = orchestrator.enroll(1, 1).await.unwrap();
        let EnrollmentOutcome::Enrolled { position } = outcome;
        assert_eq!(position, 0);
    }

    #[tokio::test]
    async fn bulk_admin_operations_are_rejected_while_registration_is_running() {
        let repo: Arc<dyn EnrollmentRepository> = Arc::new(FakeRepository::new());
        repo.create_config().await.unwrap();
        let orchestrator = Orchestrator::new(config(false), repo);
        orchestrator.start_registration().await.unwrap();

        let err = orchestrator
            .register_students(vec![student(1)])
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::WrongState));
    }

    #[tokio::test]
    async fn resume_if_enabled_restarts_the_engine_from_persisted_state() {
        let repo: Arc<dyn EnrollmentRepository> = Arc::new(FakeRepository::new());
        repo.create_config().await.unwrap();
        repo.insert_students(&[student(1)]).await.unwrap();
        repo.insert_courses(&[course(1, 10)]).await.unwrap();

        let orchestrator = Orchestrator::new(config(true), repo);
        orchestrator.resume_if_enabled(true).await.unwrap();

        let outcome = orchestrator.enroll(1, 1).await.unwrap();
        let EnrollmentOutcome::Enrolled { position } = outcome;
        assert_eq!(position, 0);
    }

    #[tokio::test]
    async fn pause_then_reset_students_succeeds() {
        let repo: Arc<dyn EnrollmentRepository> = Arc::new(FakeRepository::new());
        repo.create_config().await.unwrap();
        let orchestrator = Orchestrator::new(config(false), repo);
        orchestrator.start_registration().await.unwrap();
        orchestrator.pause_registration().await.unwrap();

        orchestrator.reset_students().await.unwrap();
    }
}
