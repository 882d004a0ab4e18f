//! Error taxonomy for the registration domain.

use thiserror::Error;

/// Failure modes for a single enrollment attempt.
#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("course {0} not found")]
    CourseNotFound(i64),
    #[error("student {0} not found")]
    StudentNotFound(i64),
    #[error("schedule conflicts with an existing enrollment")]
    TimeConflict,
    #[error("student is already enrolled in this course")]
    AlreadyEnrolled,
    #[error("course is full")]
    CourseFull,
    #[error("failed to persist enrollment: {0}")]
    Persistence(#[source] anyhow::Error),
}

/// Failure modes for registration lifecycle transitions.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("registration is not accepting enrollments right now")]
    NotInPeriod,
    #[error("registration is already {0}")]
    AlreadySet(&'static str),
    #[error("registration is already running")]
    AlreadyRunning,
    #[error("registration must be paused for this operation")]
    WrongState,
    #[error("registration is setting up, try again shortly")]
    LifecycleBusy,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

/// An enrollment attempt can fail either because the lifecycle gate
/// rejected it (not running, or mid-transition) or because the engine
/// itself rejected it (the checks in `process_enroll`).
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Enrollment(#[from] EnrollmentError),
}
