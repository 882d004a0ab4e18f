//! Schedule string parsing and pairwise conflict detection.
//!
//! A schedule string is a comma-separated list of slots, each exactly 15
//! bytes long in the form `"요일 HH:MM~HH:MM"` (weekday, a space, a start
//! time, a tilde, an end time). Intervals are half-open: `09:00~10:00`
//! and `10:00~11:00` do not conflict.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

use super::models::Course;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("schedule string is empty")]
    Empty,
    #[error("invalid slot {slot:?}: expected 15 bytes, got {len}")]
    WrongLength { slot: String, len: usize },
    #[error("invalid slot {slot:?}: unknown weekday {day:?}")]
    UnknownWeekday { slot: String, day: String },
    #[error("invalid slot {slot:?}: bad time digits")]
    BadDigits { slot: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "월" => Some(Self::Mon),
            "화" => Some(Self::Tue),
            "수" => Some(Self::Wed),
            "목" => Some(Self::Thu),
            "금" => Some(Self::Fri),
            "토" => Some(Self::Sat),
            "일" => Some(Self::Sun),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub weekday: Weekday,
    pub start_minute: u16,
    pub end_minute: u16,
}

/// A slot occupies exactly 15 bytes: 3 bytes of weekday, a space, `HH:MM`,
/// a tilde, `HH:MM`. Byte offsets below mirror the fixed-width original
/// format and are not meant to be general-purpose time parsing.
fn parse_slot(raw: &str) -> Result<TimeSlot, ScheduleError> {
    let slot = raw.trim();
    if slot.len() != 15 {
        return Err(ScheduleError::WrongLength {
            slot: slot.to_owned(),
            len: slot.len(),
        });
    }

    let day_str = &slot[0..3];
    let weekday = Weekday::from_str(day_str).ok_or_else(|| ScheduleError::UnknownWeekday {
        slot: slot.to_owned(),
        day: day_str.to_owned(),
    })?;

    let digits = |r: std::ops::Range<usize>| -> Result<u16, ScheduleError> {
        slot.get(r)
            .and_then(|s| s.parse::<u16>().ok())
            .ok_or_else(|| ScheduleError::BadDigits {
                slot: slot.to_owned(),
            })
    };

    let start_hour = digits(4..6)?;
    let start_min = digits(7..9)?;
    let end_hour = digits(10..12)?;
    let end_min = digits(13..15)?;

    Ok(TimeSlot {
        weekday,
        start_minute: start_hour * 60 + start_min,
        end_minute: end_hour * 60 + end_min,
    })
}

/// Parse a full schedule string into its component time slots.
pub fn parse_schedule(schedule: &str) -> Result<Vec<TimeSlot>, ScheduleError> {
    if schedule.trim().is_empty() {
        return Err(ScheduleError::Empty);
    }
    schedule.split(',').map(parse_slot).collect()
}

/// Two slots conflict only on the same weekday, using a half-open interval
/// check: `start1 < end2 && start2 < end1`.
pub fn slots_conflict(a: TimeSlot, b: TimeSlot) -> bool {
    a.weekday == b.weekday && a.start_minute < b.end_minute && b.start_minute < a.end_minute
}

/// True if any slot in `a` conflicts with any slot in `b`.
pub fn schedules_conflict(a: &str, b: &str) -> Result<bool, ScheduleError> {
    let slots_a = parse_schedule(a)?;
    let slots_b = parse_schedule(b)?;
    Ok(slots_a
        .iter()
        .any(|s1| slots_b.iter().any(|s2| slots_conflict(*s1, *s2))))
}

/// Symmetric adjacency map between course ids: `graph[a]` contains `b` iff
/// `graph[b]` contains `a`. No self-loops.
pub type ConflictGraph = HashMap<i64, HashSet<i64>>;

/// Build the conflict graph for a course catalog with a single pairwise
/// (N^2) pass, as the original implementation does.
pub fn build_conflict_graph(courses: &[Course]) -> Result<ConflictGraph, ScheduleError> {
    let mut graph: ConflictGraph = courses.iter().map(|c| (c.id, HashSet::new())).collect();

    for i in 0..courses.len() {
        for j in (i + 1)..courses.len() {
            let a = &courses[i];
            let b = &courses[j];
            if schedules_conflict(&a.schedules, &b.schedules)? {
                graph.entry(a.id).or_default().insert(b.id);
                graph.entry(b.id).or_default().insert(a.id);
            }
        }
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: i64, schedules: &str) -> Course {
        Course {
            id,
            name: format!("course-{id}"),
            instructor: "instructor".to_owned(),
            description: String::new(),
            schedules: schedules.to_owned(),
            capacity: 10,
            is_special: false,
        }
    }

    #[test]
    fn parses_single_slot() {
        let slots = parse_schedule("월 09:00~10:00").unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].weekday, Weekday::Mon);
        assert_eq!(slots[0].start_minute, 540);
        assert_eq!(slots[0].end_minute, 600);
    }

    #[test]
    fn parses_multiple_comma_separated_slots() {
        let slots = parse_schedule("월 09:00~10:00,수 09:00~10:00").unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].weekday, Weekday::Wed);
    }

    #[test]
    fn rejects_empty_schedule() {
        assert_eq!(parse_schedule(""), Err(ScheduleError::Empty));
        assert_eq!(parse_schedule("   "), Err(ScheduleError::Empty));
    }

    #[test]
    fn rejects_wrong_length_slot() {
        let err = parse_schedule("월 09:00~10:0").unwrap_err();
        assert!(matches!(err, ScheduleError::WrongLength { .. }));
    }

    #[test]
    fn rejects_unknown_weekday() {
        let err = parse_schedule("월월 09:00~1").unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::WrongLength { .. } | ScheduleError::UnknownWeekday { .. }
        ));
    }

    #[test]
    fn adjacent_slots_do_not_conflict() {
        assert!(!schedules_conflict("월 09:00~10:00", "월 10:00~11:00").unwrap());
    }

    #[test]
    fn overlapping_slots_conflict() {
        assert!(schedules_conflict("월 09:00~10:30", "월 10:00~11:00").unwrap());
    }

    #[test]
    fn different_days_never_conflict() {
        assert!(!schedules_conflict("월 09:00~10:00", "화 09:00~10:00").unwrap());
    }

    #[test]
    fn conflict_graph_is_symmetric_with_no_self_loops() {
        let courses = vec![
            course(1, "월 09:00~10:00"),
            course(2, "월 09:30~10:30"),
            course(3, "화 09:00~10:00"),
        ];
        let graph = build_conflict_graph(&courses).unwrap();
        assert!(graph[&1].contains(&2));
        assert!(graph[&2].contains(&1));
        assert!(!graph[&1].contains(&1));
        assert!(graph.get(&3).map(|s| s.is_empty()).unwrap_or(true));
    }
}
