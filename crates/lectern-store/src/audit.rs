//! Audit event types

use chrono::{DateTime, Utc};
use lectern_types::{Decision, StaffRole};
use lectern_util::{CourseCode, LectureId, QuestionId, UserId};
use serde::{Deserialize, Serialize};

/// Types of audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Course created
    CourseCreated {
        course_code: CourseCode,
        created_by: UserId,
    },

    /// Additional teacher added
    TeacherAdded {
        course_code: CourseCode,
        user: UserId,
        added_by: UserId,
    },

    /// Student requested to join a course
    EnrollmentRequested {
        course_code: CourseCode,
        student: UserId,
    },

    /// Teacher decided a pending request
    EnrollmentDecided {
        course_code: CourseCode,
        student: UserId,
        decision: Decision,
        decided_by: UserId,
    },

    /// Enrolled student promoted to assistant
    AssistantPromoted {
        course_code: CourseCode,
        student: UserId,
        by: UserId,
    },

    /// Assistant demoted back to plain enrollment
    AssistantDemoted {
        course_code: CourseCode,
        student: UserId,
        by: UserId,
    },

    /// Student left a course
    StudentLeft {
        course_code: CourseCode,
        student: UserId,
    },

    /// Lecture created
    LectureCreated {
        lecture_id: LectureId,
        course_code: CourseCode,
        number: u32,
        created_by: UserId,
    },

    /// Teacher ended a live lecture early
    LectureEndedEarly {
        lecture_id: LectureId,
        ended_by: UserId,
    },

    /// Student joined a live lecture
    LectureJoined {
        lecture_id: LectureId,
        student: UserId,
    },

    /// Question asked in a doubt thread
    QuestionAsked {
        question_id: QuestionId,
        lecture_id: LectureId,
        author: UserId,
    },

    /// Answer appended to a question
    AnswerPosted {
        question_id: QuestionId,
        author: UserId,
        role: StaffRole,
    },
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Utc>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp: lectern_util::now(),
            event,
        }
    }
}
