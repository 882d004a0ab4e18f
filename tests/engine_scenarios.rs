//! Integration-style scenarios S1-S6 against `data::fake::FakeRepository`.

use std::sync::Arc;
use std::time::Duration;

use course_reg::data::fake::FakeRepository;
use course_reg::domain::engine::{EnrollmentEngine, EnrollmentOutcome};
use course_reg::domain::errors::{EnrollmentError, LifecycleError, RegistrationError};
use course_reg::domain::models::{Course, Enrollment, RegistrationConfig, Student};
use course_reg::domain::persistence::EnrollmentRepository;
use course_reg::orchestrator::Orchestrator;

fn student(id: i64) -> Student {
    Student {
        id,
        name: format!("student-{id}"),
        phone: format!("010-0000-{id:04}"),
        birth_date: "19990101".to_owned(),
    }
}

fn course(id: i64, schedules: &str, capacity: i32) -> Course {
    Course {
        id,
        name: format!("course-{id}"),
        instructor: "instructor".to_owned(),
        description: String::new(),
        schedules: schedules.to_owned(),
        capacity,
        is_special: false,
    }
}

fn config(enabled: bool) -> RegistrationConfig {
    RegistrationConfig {
        id: course_reg::domain::models::REGISTRATION_CONFIG_ID,
        enabled,
        start_time: "2026-01-01T00:00:00Z".into(),
        end_time: "2026-01-02T00:00:00Z".into(),
    }
}

/// S1. Capacity race: 100 concurrent enrollments against a capacity-1
/// course. Exactly one succeeds, at position 0; the rest are rejected as
/// full, and exactly one durable row is written.
#[tokio::test]
async fn s1_capacity_race_admits_exactly_one_of_one_hundred() {
    let repo = Arc::new(FakeRepository::new());
    let students: Vec<Student> = (1..=100).map(student).collect();
    let engine = EnrollmentEngine::start(
        students,
        vec![course(1, "월 09:00~10:00", 1)],
        vec![],
        repo.clone(),
    );

    let attempts = (1..=100).map(|id| {
        let engine = engine.clone();
        tokio::spawn(async move { engine.enroll(id, 1).await })
    });
    let results: Vec<_> = futures_join_all(attempts).await;

    let successes: Vec<_> = results
        .iter()
        .filter(|r| matches!(r, Ok(Ok(EnrollmentOutcome::Enrolled { .. }))))
        .collect();
    let full_rejections = results
        .iter()
        .filter(|r| matches!(r, Ok(Err(EnrollmentError::CourseFull))))
        .count();

    assert_eq!(successes.len(), 1);
    assert_eq!(full_rejections, 99);
    if let Ok(Ok(EnrollmentOutcome::Enrolled { position })) = successes[0] {
        assert_eq!(*position, 0);
    }

    let rows = repo.fetch_all_enrollments().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].position, 0);
}

/// Minimal stand-in for `futures::future::join_all` so this test file
/// doesn't need an extra dependency just for one join.
async fn futures_join_all<T>(
    handles: impl Iterator<Item = tokio::task::JoinHandle<T>>,
) -> Vec<Result<T, tokio::task::JoinError>> {
    let mut out = Vec::new();
    for handle in handles {
        out.push(handle.await);
    }
    out
}

/// S2. Duplicate: a second immediate enroll by the same student in the
/// same course is rejected, and only one durable row exists.
#[tokio::test]
async fn s2_duplicate_enrollment_is_rejected_with_one_durable_row() {
    let repo = Arc::new(FakeRepository::new());
    let engine = EnrollmentEngine::start(
        vec![student(1)],
        vec![course(1, "월 09:00~10:00", 5)],
        vec![],
        repo.clone(),
    );

    let first = engine.enroll(1, 1).await;
    assert!(matches!(first, Ok(EnrollmentOutcome::Enrolled { position: 0 })));

    let second = engine.enroll(1, 1).await;
    assert!(matches!(second, Err(EnrollmentError::AlreadyEnrolled)));

    let rows = repo.fetch_all_enrollments().await.unwrap();
    assert_eq!(rows.len(), 1);
}

/// S3. Conflict and the half-open boundary: overlapping schedules
/// conflict, back-to-back schedules do not.
#[tokio::test]
async fn s3_overlapping_schedules_conflict_adjacent_do_not() {
    let repo = Arc::new(FakeRepository::new());
    let engine = EnrollmentEngine::start(
        vec![student(1)],
        vec![
            course(1, "월 09:00~10:30", 5),
            course(2, "월 10:00~11:00", 5),
        ],
        vec![],
        repo,
    );
    assert!(engine.enroll(1, 1).await.is_ok());
    let result = engine.enroll(1, 2).await;
    assert!(matches!(result, Err(EnrollmentError::TimeConflict)));

    let repo = Arc::new(FakeRepository::new());
    let engine = EnrollmentEngine::start(
        vec![student(1)],
        vec![
            course(1, "월 09:00~10:00", 5),
            course(2, "월 10:00~11:00", 5),
        ],
        vec![],
        repo,
    );
    assert!(engine.enroll(1, 1).await.is_ok());
    assert!(engine.enroll(1, 2).await.is_ok());
}

/// S4. Restart: the position counter resumes from the highest existing
/// position rather than restarting at zero.
#[tokio::test]
async fn s4_restart_resumes_position_counter() {
    let repo = Arc::new(FakeRepository::new());
    let existing = vec![
        Enrollment {
            id: 1,
            student_id: 1,
            course_id: 1,
            position: 0,
            is_waitlist: false,
            created_at: chrono::Utc::now(),
        },
        Enrollment {
            id: 2,
            student_id: 2,
            course_id: 1,
            position: 1,
            is_waitlist: false,
            created_at: chrono::Utc::now(),
        },
    ];
    let engine = EnrollmentEngine::start(
        vec![student(1), student(2), student(3)],
        vec![course(1, "월 09:00~10:00", 5)],
        existing,
        repo,
    );

    let result = engine.enroll(3, 1).await.unwrap();
    assert!(matches!(result, EnrollmentOutcome::Enrolled { position: 2 }));
}

/// S5. Lifecycle gating: disabled rejects, starting admits, pausing
/// rejects again.
#[tokio::test]
async fn s5_lifecycle_gates_enrollment_across_start_and_pause() {
    let repo: Arc<dyn EnrollmentRepository> = Arc::new(FakeRepository::new());
    repo.create_config().await.unwrap();
    repo.insert_students(&[student(1)]).await.unwrap();
    repo.insert_courses(&[course(1, "월 09:00~10:00", 5)])
        .await
        .unwrap();

    let orchestrator = Orchestrator::new(config(false), repo);

    let err = orchestrator.enroll(1, 1).await.unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Lifecycle(LifecycleError::NotInPeriod)
    ));

    orchestrator.start_registration().await.unwrap();
    let outcome = orchestrator.enroll(1, 1).await.unwrap();
    assert!(matches!(outcome, EnrollmentOutcome::Enrolled { position: 0 }));

    orchestrator.pause_registration().await.unwrap();
    let err = orchestrator.enroll(1, 1).await.unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Lifecycle(LifecycleError::NotInPeriod)
    ));
}

/// S6. Transition contention: a slow `change_enabled_and_act` holds the
/// lifecycle write lock, so a concurrent enroll fails fast with
/// `LifecycleBusy` instead of blocking on the transition.
#[tokio::test]
async fn s6_concurrent_enroll_fails_fast_during_a_slow_transition() {
    let repo = Arc::new(FakeRepository::new());
    repo.create_config().await.unwrap();
    repo.set_update_enabled_delay(Duration::from_millis(200));

    let orchestrator = Arc::new(Orchestrator::new(config(false), repo));

    let background = orchestrator.clone();
    let start_handle = tokio::spawn(async move { background.start_registration().await });

    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = orchestrator.enroll(1, 1).await.unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::Lifecycle(LifecycleError::LifecycleBusy)
    ));

    start_handle.await.unwrap().unwrap();
}
