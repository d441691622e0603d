//! Course document and membership state

use chrono::{DateTime, Utc};
use lectern_util::{CourseCode, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A course as stored in the document store
///
/// Membership (pending/enrolled/assistant) lives in its own relation keyed by
/// (course, student); a [`Roster`] assembles the sets for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub code: CourseCode,
    pub name: String,
    pub batch: String,
    pub branch: String,
    /// Ordered: the creator is first and primary
    pub teachers: Vec<UserId>,
    /// Enrollment requests are rejected after this instant
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn is_teacher(&self, user: &UserId) -> bool {
        self.teachers.iter().any(|t| t == user)
    }

    pub fn primary_teacher(&self) -> Option<&UserId> {
        self.teachers.first()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.valid_until
    }
}

/// Membership state of one student on one course
///
/// One row per (course, student) makes the invariants structural: a student
/// is never simultaneously pending and enrolled, and every assistant is
/// enrolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberState {
    Pending,
    Enrolled,
    Assistant,
}

impl MemberState {
    pub fn is_enrolled(&self) -> bool {
        matches!(self, MemberState::Enrolled | MemberState::Assistant)
    }
}

/// Decision on a pending enrollment request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Deny,
}

/// Assembled membership sets of a course
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub teachers: Vec<UserId>,
    pub assistants: BTreeSet<UserId>,
    pub enrolled: BTreeSet<UserId>,
    pub pending: BTreeSet<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_course() -> Course {
        Course {
            code: CourseCode::new("CS101"),
            name: "Intro to Computer Science".into(),
            batch: "2026".into(),
            branch: "CSE".into(),
            teachers: vec![UserId::new("t1"), UserId::new("t2")],
            valid_until: Utc.with_ymd_and_hms(2026, 12, 31, 0, 0, 0).unwrap(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn primary_teacher_is_first() {
        let course = make_course();
        assert_eq!(course.primary_teacher(), Some(&UserId::new("t1")));
        assert!(course.is_teacher(&UserId::new("t2")));
        assert!(!course.is_teacher(&UserId::new("s1")));
    }

    #[test]
    fn expiry_is_strict() {
        let course = make_course();
        assert!(!course.is_expired(course.valid_until));
        assert!(course.is_expired(course.valid_until + chrono::Duration::seconds(1)));
    }

    #[test]
    fn assistant_counts_as_enrolled() {
        assert!(MemberState::Assistant.is_enrolled());
        assert!(MemberState::Enrolled.is_enrolled());
        assert!(!MemberState::Pending.is_enrolled());
    }
}
