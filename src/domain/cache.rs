//! In-memory enrollment cache: the source of truth for admission decisions.
//!
//! Mirrors the original `EnrollmentCache`: per-course capacity and
//! conflict-graph lookups, per-student enrolled/waiting sets, and atomic
//! enrolled/waiting counters per course. Reads never block a writer and
//! writers never block a reader beyond the atomic increment itself.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI32, Ordering};

use super::models::{Course, CourseCountInfo, Enrollment, Student};
use super::schedule::{self, ConflictGraph};

pub struct EnrollmentCache {
    course_capacity: HashMap<i64, i32>,
    conflict_graph: ConflictGraph,
    student_ids: HashSet<i64>,
    student_enrolled: HashMap<i64, HashSet<i64>>,
    student_waiting: HashMap<i64, HashSet<i64>>,
    enrolled_count: HashMap<i64, AtomicI32>,
    waiting_count: HashMap<i64, AtomicI32>,
}

impl EnrollmentCache {
    /// Build a fresh cache from the full set of students, courses, and
    /// existing enrollments (e.g. on process restart). Enrollment
    /// positions determine the restored counters: the highest observed
    /// `position + 1` for each course/kind wins, mirroring the original's
    /// `max(current, position + 1)` reload rule.
    pub fn load(students: &[Student], courses: &[Course], enrollments: &[Enrollment]) -> Self {
        let course_capacity: HashMap<i64, i32> =
            courses.iter().map(|c| (c.id, c.capacity)).collect();
        let student_ids = students.iter().map(|s| s.id).collect();

        let mut student_enrolled: HashMap<i64, HashSet<i64>> = HashMap::new();
        let mut student_waiting: HashMap<i64, HashSet<i64>> = HashMap::new();
        // Every course starts at count 0, not just ones with existing
        // enrollments -- `enroll_student` assumes an entry always exists.
        let mut enrolled_count: HashMap<i64, i32> =
            course_capacity.keys().map(|&id| (id, 0)).collect();
        let mut waiting_count: HashMap<i64, i32> =
            course_capacity.keys().map(|&id| (id, 0)).collect();

        for e in enrollments {
            if e.is_waitlist {
                student_waiting.entry(e.student_id).or_default().insert(e.course_id);
                let slot = waiting_count.entry(e.course_id).or_insert(0);
                *slot = (*slot).max(e.position + 1);
            } else {
                student_enrolled.entry(e.student_id).or_default().insert(e.course_id);
                let slot = enrolled_count.entry(e.course_id).or_insert(0);
                *slot = (*slot).max(e.position + 1);
            }
        }

        let conflict_graph = schedule::build_conflict_graph(courses)
            .expect("course schedules must already be validated before reaching the cache");

        Self {
            course_capacity,
            conflict_graph,
            student_ids,
            student_enrolled,
            student_waiting,
            enrolled_count: enrolled_count
                .into_iter()
                .map(|(k, v)| (k, AtomicI32::new(v)))
                .collect(),
            waiting_count: waiting_count
                .into_iter()
                .map(|(k, v)| (k, AtomicI32::new(v)))
                .collect(),
        }
    }

    pub fn course_exists(&self, course_id: i64) -> bool {
        self.course_capacity.contains_key(&course_id)
    }

    pub fn student_exists(&self, student_id: i64) -> bool {
        self.student_ids.contains(&student_id)
    }

    pub fn is_student_enrolled(&self, student_id: i64, course_id: i64) -> bool {
        self.student_enrolled
            .get(&student_id)
            .is_some_and(|set| set.contains(&course_id))
    }

    /// True if `course_id` conflicts, via the prebuilt conflict graph, with
    /// any course the student is already enrolled in.
    pub fn has_time_conflict(&self, student_id: i64, course_id: i64) -> bool {
        let Some(neighbors) = self.conflict_graph.get(&course_id) else {
            return false;
        };
        self.student_enrolled
            .get(&student_id)
            .is_some_and(|enrolled| enrolled.iter().any(|c| neighbors.contains(c)))
    }

    /// The next enrolled position for `course_id` if the course is not
    /// full, or an error if it is at capacity.
    pub fn next_position_if_not_full(&self, course_id: i64) -> Result<i32, ()> {
        let capacity = *self.course_capacity.get(&course_id).ok_or(())?;
        let current = self
            .enrolled_count
            .get(&course_id)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0);
        if current >= capacity {
            return Err(());
        }
        Ok(current)
    }

    /// Record a successful enrollment at `position`. Must only be called
    /// after the durable append has succeeded.
    pub fn enroll_student(&mut self, student_id: i64, course_id: i64, position: i32) {
        self.enrolled_count
            .get(&course_id)
            .expect("course must exist in cache before enrolling")
            .fetch_max(position + 1, Ordering::SeqCst);
        self.student_enrolled
            .entry(student_id)
            .or_default()
            .insert(course_id);
    }

    pub fn count_info(&self, course_id: i64) -> Option<CourseCountInfo> {
        let capacity = *self.course_capacity.get(&course_id)?;
        let enrolled_count = self
            .enrolled_count
            .get(&course_id)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0);
        let waiting_count = self
            .waiting_count
            .get(&course_id)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0);
        Some(CourseCountInfo {
            capacity,
            enrolled_count,
            waiting_count,
        })
    }

    pub fn all_course_count_info(&self) -> HashMap<i64, CourseCountInfo> {
        self.course_capacity
            .keys()
            .filter_map(|id| self.count_info(*id).map(|info| (*id, info)))
            .collect()
    }
}
