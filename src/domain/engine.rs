//! The Enrollment Engine: a single dedicated worker task that owns the
//! `EnrollmentCache` and serializes every admission decision through one
//! inbound channel, replying on a per-request oneshot channel.

use tokio::sync::{mpsc, oneshot};

use super::cache::EnrollmentCache;
use super::errors::EnrollmentError;
use super::models::{Course, CourseCountInfo, Enrollment, Student};
use super::persistence::EnrollmentRepository;
use std::collections::HashMap;
use std::sync::Arc;

const INBOUND_CHANNEL_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentOutcome {
    Enrolled { position: i32 },
}

enum Request {
    Enroll {
        student_id: i64,
        course_id: i64,
        reply: oneshot::Sender<Result<EnrollmentOutcome, EnrollmentError>>,
    },
    Status {
        reply: oneshot::Sender<HashMap<i64, CourseCountInfo>>,
    },
}

/// A handle to a running engine. Cloning shares the same worker task.
#[derive(Clone)]
pub struct EnrollmentEngine {
    tx: mpsc::Sender<Request>,
}

impl EnrollmentEngine {
    /// Load the cache from the given snapshot and spawn the worker task.
    pub fn start(
        students: Vec<Student>,
        courses: Vec<Course>,
        enrollments: Vec<Enrollment>,
        repo: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(INBOUND_CHANNEL_CAPACITY);
        let cache = EnrollmentCache::load(&students, &courses, &enrollments);
        tokio::spawn(Self::worker_loop(rx, cache, repo));
        Self { tx }
    }

    async fn worker_loop(
        mut rx: mpsc::Receiver<Request>,
        mut cache: EnrollmentCache,
        repo: Arc<dyn EnrollmentRepository>,
    ) {
        while let Some(request) = rx.recv().await {
            match request {
                Request::Enroll {
                    student_id,
                    course_id,
                    reply,
                } => {
                    let outcome =
                        Self::process_enroll(&mut cache, repo.as_ref(), student_id, course_id)
                            .await;
                    let _ = reply.send(outcome);
                }
                Request::Status { reply } => {
                    let _ = reply.send(cache.all_course_count_info());
                }
            }
        }
        tracing::info!("enrollment engine worker loop exiting (channel closed)");
    }

    /// Admission check order: course exists, student exists, time
    /// conflict, already enrolled, capacity, then the durable append.
    /// The append happens *before* any cache mutation -- if it fails, the
    /// request is rejected and no counter moves. This is the fix for the
    /// durability-vs-acceptance bug: the original advanced the in-memory
    /// counter unconditionally, even when the insert failed.
    async fn process_enroll(
        cache: &mut EnrollmentCache,
        repo: &dyn EnrollmentRepository,
        student_id: i64,
        course_id: i64,
    ) -> Result<EnrollmentOutcome, EnrollmentError> {
        if !cache.course_exists(course_id) {
            return Err(EnrollmentError::CourseNotFound(course_id));
        }
        if !cache.student_exists(student_id) {
            return Err(EnrollmentError::StudentNotFound(student_id));
        }
        if cache.has_time_conflict(student_id, course_id) {
            return Err(EnrollmentError::TimeConflict);
        }
        if cache.is_student_enrolled(student_id, course_id) {
            return Err(EnrollmentError::AlreadyEnrolled);
        }
        let position = cache
            .next_position_if_not_full(course_id)
            .map_err(|()| EnrollmentError::CourseFull)?;

        repo.insert_enrollment(student_id, course_id, position, false)
            .await
            .map_err(EnrollmentError::Persistence)?;

        cache.enroll_student(student_id, course_id, position);
        Ok(EnrollmentOutcome::Enrolled { position })
    }

    pub async fn enroll(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<EnrollmentOutcome, EnrollmentError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Request::Enroll {
                student_id,
                course_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| {
                EnrollmentError::Persistence(anyhow::anyhow!("enrollment engine is not running"))
            })?;
        reply_rx.await.map_err(|_| {
            EnrollmentError::Persistence(anyhow::anyhow!("enrollment engine dropped the request"))
        })?
    }

    pub async fn status(&self) -> anyhow::Result<HashMap<i64, CourseCountInfo>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Request::Status { reply: reply_tx })
            .await
            .map_err(|_| anyhow::anyhow!("enrollment engine is not running"))?;
        reply_rx
            .await
            .map_err(|_| anyhow::anyhow!("enrollment engine dropped the request"))
    }
}
