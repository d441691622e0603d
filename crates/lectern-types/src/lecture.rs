//! Lecture document and phase derivation

use chrono::{DateTime, Utc};
use lectern_util::{CourseCode, LectureId, UserId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Derived lifecycle phase of a lecture
///
/// Never stored; always recomputed from the lecture's time window and the
/// one-way teacher-ended flag. Tagged variants, not strings, so every
/// phase-dependent decision is an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LecturePhase {
    Scheduled,
    Live,
    EndedNaturally,
    EndedByTeacher,
}

impl LecturePhase {
    pub fn is_ended(&self) -> bool {
        matches!(self, LecturePhase::EndedNaturally | LecturePhase::EndedByTeacher)
    }
}

/// A lecture as stored in the document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    pub id: LectureId,
    pub course_code: CourseCode,
    /// Sequential number within the course, assigned atomically at creation
    pub number: u32,
    pub title: String,
    pub start_at: DateTime<Utc>,
    /// Inclusive upper bound of the scheduled window; `end_at > start_at`
    pub end_at: DateTime<Utc>,
    pub created_by: UserId,
    /// Set once by `end_early` while the lecture is live; irreversible
    pub teacher_ended_at: Option<DateTime<Utc>>,
}

impl Lecture {
    /// Derive the lecture's phase at the given instant.
    ///
    /// This is the single source of truth for lecture state; the engine
    /// routes every phase-dependent decision through it.
    pub fn phase(&self, now: DateTime<Utc>) -> LecturePhase {
        if self.teacher_ended_at.is_some() {
            return LecturePhase::EndedByTeacher;
        }
        if now < self.start_at {
            LecturePhase::Scheduled
        } else if now <= self.end_at {
            LecturePhase::Live
        } else {
            LecturePhase::EndedNaturally
        }
    }

    /// Whether the lecture should appear in a "joinable now" listing.
    ///
    /// A presentation policy layered on top of [`Lecture::phase`], not a new
    /// phase: live lectures are always listed, and the configured grace
    /// margins widen the listing around the scheduled window. A lecture the
    /// teacher ended early is never listed.
    pub fn in_join_window(&self, now: DateTime<Utc>, before: Duration, after: Duration) -> bool {
        match self.phase(now) {
            LecturePhase::Live => true,
            LecturePhase::Scheduled => self.start_at - now <= grace(before),
            LecturePhase::EndedNaturally => now - self.end_at <= grace(after),
            LecturePhase::EndedByTeacher => false,
        }
    }
}

/// Config validation bounds grace margins to under a day, so the conversion
/// cannot overflow; saturate rather than fail if it ever does.
fn grace(d: Duration) -> chrono::Duration {
    chrono::Duration::from_std(d).unwrap_or(chrono::Duration::MAX)
}
